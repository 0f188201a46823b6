//! Short code generation

use rand::RngExt;

/// Produces candidate short codes. Uniqueness is checked by the caller.
pub trait CodeGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// 随机十六进制短码（线程本地 CSPRNG）
///
/// `length` 为十六进制字符数，每个随机字节对应两个字符。
#[derive(Debug, Clone, Copy)]
pub struct RandomHexGenerator {
    length: usize,
}

impl RandomHexGenerator {
    pub fn new(length: usize) -> Self {
        Self { length }
    }

    pub fn length(&self) -> usize {
        self.length
    }
}

impl CodeGenerator for RandomHexGenerator {
    fn generate(&self) -> String {
        let mut bytes = vec![0u8; self.length.div_ceil(2)];
        rand::rng().fill(&mut bytes[..]);

        let mut code: String = bytes.iter().map(|b| format!("{:02x}", b)).collect();
        code.truncate(self.length);
        code
    }
}
