/// Reusable scratch buffers for hot loops
///
/// Node expansion runs thousands of times per planner slice; candidate
/// buffers are checked out of this pool and returned cleared instead of
/// allocating fresh vectors on every expansion.
#[derive(Debug)]
pub struct ScratchPool<T> {
    free: Vec<Vec<T>>,
    /// How many buffers were ever handed out without a matching return
    leaked: usize,
}

impl<T> ScratchPool<T> {
    pub fn new() -> Self {
        Self {
            free: Vec::new(),
            leaked: 0,
        }
    }

    /// Check out an empty buffer, reusing a previously returned one if any
    pub fn take(&mut self) -> Vec<T> {
        match self.free.pop() {
            Some(buf) => buf,
            None => {
                self.leaked += 1;
                Vec::new()
            }
        }
    }

    /// Return a buffer to the pool; contents are dropped
    pub fn put(&mut self, mut buf: Vec<T>) {
        buf.clear();
        self.free.push(buf);
        self.leaked = self.leaked.saturating_sub(1);
    }

    /// Buffers currently checked out
    pub fn outstanding(&self) -> usize {
        self.leaked
    }
}

impl<T> Default for ScratchPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_reuses_buffers() {
        let mut pool: ScratchPool<u32> = ScratchPool::new();
        let mut buf = pool.take();
        buf.push(1);
        buf.push(2);
        let cap = buf.capacity();
        pool.put(buf);

        let reused = pool.take();
        assert!(reused.is_empty());
        assert_eq!(reused.capacity(), cap);
    }

    #[test]
    fn test_pool_tracks_outstanding() {
        let mut pool: ScratchPool<u32> = ScratchPool::new();
        let a = pool.take();
        let _b = pool.take();
        assert_eq!(pool.outstanding(), 2);
        pool.put(a);
        assert_eq!(pool.outstanding(), 1);
    }
}
