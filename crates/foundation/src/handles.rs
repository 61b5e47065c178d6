/// Generational handle: (index, generation).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(u32, u32);

impl Handle {
    pub fn new(index: u32, generation: u32) -> Self {
        Handle(index, generation)
    }

    pub fn index(&self) -> u32 {
        self.0
    }

    pub fn generation(&self) -> u32 {
        self.1
    }
}

/// Hands out handles in allocation order, reusing freed slots with a bumped
/// generation so stale handles never compare equal to live ones.
#[derive(Debug, Default)]
pub struct HandleAllocator {
    generations: Vec<u32>,
    free: Vec<u32>,
}

impl HandleAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self) -> Handle {
        if let Some(index) = self.free.pop() {
            return Handle::new(index, self.generations[index as usize]);
        }
        let index = self.generations.len() as u32;
        self.generations.push(0);
        Handle::new(index, 0)
    }

    /// Returns `false` if the handle was already freed (or never issued).
    pub fn free(&mut self, handle: Handle) -> bool {
        if !self.is_live(handle) {
            return false;
        }
        let slot = &mut self.generations[handle.index() as usize];
        *slot = slot.wrapping_add(1);
        self.free.push(handle.index());
        true
    }

    pub fn is_live(&self, handle: Handle) -> bool {
        self.generations
            .get(handle.index() as usize)
            .is_some_and(|g| *g == handle.generation())
    }
}
