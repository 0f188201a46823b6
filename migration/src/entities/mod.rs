pub mod link;
pub mod visit_event;

pub use link::Entity as LinkEntity;
pub use visit_event::Entity as VisitEventEntity;
