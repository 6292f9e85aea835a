use crate::ObjectHandle;

/// Hands out object handles in increasing order. A handle is never issued twice,
/// even after the object it named is destroyed.
pub struct HandleGenerator {
    next: u64,
}

impl HandleGenerator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn generate(&mut self) -> ObjectHandle {
        let handle = ObjectHandle::from_u64(self.next);
        self.next += 1;
        handle
    }
}

impl Default for HandleGenerator {
    fn default() -> Self {
        Self::new()
    }
}
