use sea_orm::ActiveValue::{NotSet, Set};

use crate::storage::{Link, NewLink, NewVisitEvent, VisitEvent};
use migration::entities::{link, visit_event};

/// 将 Sea-ORM Model 转换为 Link
pub fn link_model_to_link(model: link::Model) -> Link {
    Link {
        id: model.id,
        owner_id: model.owner_id,
        original_link: model.original_link,
        short_link: model.short_link,
        remark: model.remark,
        expire: model.expire,
        count: model.count.max(0),
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

pub fn new_link_to_active_model(link: NewLink) -> link::ActiveModel {
    link::ActiveModel {
        id: NotSet,
        owner_id: Set(link.owner_id),
        original_link: Set(link.original_link),
        short_link: Set(link.short_link),
        remark: Set(link.remark),
        expire: Set(link.expire),
        count: Set(0),
        created_at: Set(link.created_at),
        updated_at: Set(link.created_at),
    }
}

pub fn visit_model_to_event(model: visit_event::Model) -> VisitEvent {
    VisitEvent {
        id: model.id,
        link_id: model.link_id,
        owner_id: model.owner_id,
        ip_address: model.ip_address,
        user_agent: model.user_agent,
        device_type: model.device_type,
        os_name: model.os_name,
        browser_name: model.browser_name,
        time: model.time,
    }
}

pub fn new_event_to_active_model(event: NewVisitEvent) -> visit_event::ActiveModel {
    visit_event::ActiveModel {
        id: NotSet,
        link_id: Set(event.link_id),
        owner_id: Set(event.owner_id),
        ip_address: Set(event.ip_address),
        user_agent: Set(event.user_agent),
        device_type: Set(event.device_type),
        os_name: Set(event.os_name),
        browser_name: Set(event.browser_name),
        time: Set(event.time),
    }
}
