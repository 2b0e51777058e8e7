// Frame dts that sum to a lifetime can land a few ulps short of it.
const EXPIRY_SLACK: f32 = 1e-4;

/// Normalized life left, 1 at spawn down to 0, for an entry `age` seconds
/// into a `duration`-second lifetime. `None` once the lifetime is used up.
pub fn remaining_life(age: f32, duration: f32) -> Option<f32> {
    if age >= duration * (1.0 - EXPIRY_SLACK) {
        None
    } else {
        Some(1.0 - age / duration)
    }
}

pub trait Slot {
    fn is_active(&self) -> bool;
    fn deactivate(&mut self);
}

/// Fixed-capacity slot array with a wrapping write cursor. Slots are never
/// allocated or freed after construction, only overwritten.
#[derive(Clone, Debug)]
pub struct RingPool<T> {
    slots: Vec<T>,
    cursor: usize,
}

impl<T: Default> RingPool<T> {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "ring pool needs at least one slot");
        Self {
            slots: (0..capacity).map(|_| T::default()).collect(),
            cursor: 0,
        }
    }
}

impl<T> RingPool<T> {
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Advances the cursor and returns that slot whatever it holds; a live
    /// entry in it is overwritten.
    pub fn claim(&mut self) -> (usize, &mut T) {
        self.cursor = (self.cursor + 1) % self.slots.len();
        let index = self.cursor;
        (index, &mut self.slots[index])
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.slots.get(index)
    }

    pub fn slots(&self) -> &[T] {
        &self.slots
    }

    pub fn slots_mut(&mut self) -> &mut [T] {
        &mut self.slots
    }
}

impl<T: Slot> RingPool<T> {
    /// Like [`RingPool::claim`], but prefers the next inactive slot after the
    /// cursor. Falls back to overwriting when every slot is live.
    pub fn claim_free(&mut self) -> (usize, &mut T) {
        let capacity = self.slots.len();
        let free = (1..=capacity)
            .map(|step| (self.cursor + step) % capacity)
            .find(|&index| !self.slots[index].is_active());

        match free {
            Some(index) => {
                self.cursor = index;
                (index, &mut self.slots[index])
            }
            None => self.claim(),
        }
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_active()).count()
    }

    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            slot.deactivate();
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::{remaining_life, RingPool, Slot};

    #[derive(Clone, Debug, Default)]
    struct Tag {
        id: u32,
        active: bool,
    }

    impl Slot for Tag {
        fn is_active(&self) -> bool {
            self.active
        }

        fn deactivate(&mut self) {
            self.active = false;
        }
    }

    fn fill(pool: &mut RingPool<Tag>, ids: std::ops::Range<u32>) {
        for id in ids {
            let (_, slot) = pool.claim();
            *slot = Tag { id, active: true };
        }
    }

    #[test]
    fn claim_advances_before_writing() {
        let mut pool = RingPool::<Tag>::new(4);
        let (first, _) = pool.claim();
        assert_eq!(first, 1);
        let (second, _) = pool.claim();
        assert_eq!(second, 2);
        assert_eq!(pool.cursor(), 2);
    }

    #[test]
    fn overflow_by_one_overwrites_only_the_first_spawned() {
        let capacity = 8;
        let mut pool = RingPool::<Tag>::new(capacity);
        fill(&mut pool, 0..capacity as u32 + 1);

        let mut ids: Vec<u32> = pool.slots().iter().map(|tag| tag.id).collect();
        ids.sort_unstable();
        let expected: Vec<u32> = (1..=capacity as u32).collect();
        assert_eq!(ids, expected, "only id 0 should be missing");
        assert_eq!(pool.active_count(), capacity);
    }

    #[test]
    fn claim_free_skips_live_slots() {
        let mut pool = RingPool::<Tag>::new(4);
        fill(&mut pool, 0..2);
        pool.slots_mut()[3].active = true;

        let (index, _) = pool.claim_free();
        assert_eq!(index, 0);
    }

    #[test]
    fn claim_free_overwrites_when_full() {
        let mut pool = RingPool::<Tag>::new(3);
        fill(&mut pool, 0..3);
        let cursor = pool.cursor();

        let (index, _) = pool.claim_free();
        assert_eq!(index, (cursor + 1) % 3);
    }

    #[test]
    fn clear_deactivates_everything() {
        let mut pool = RingPool::<Tag>::new(5);
        fill(&mut pool, 0..5);
        pool.clear();
        assert_eq!(pool.active_count(), 0);
        assert_eq!(pool.capacity(), 5);
    }

    #[test]
    fn remaining_life_runs_from_one_to_expiry() {
        assert_eq!(remaining_life(0.0, 0.5), Some(1.0));
        assert_eq!(remaining_life(0.25, 0.5), Some(0.5));
        assert_eq!(remaining_life(0.5, 0.5), None);
        assert_eq!(remaining_life(0.75, 0.5), None);
    }

    proptest! {
        #[test]
        fn equal_frames_summing_to_a_lifetime_expire_it(duration in 0.05f32..2.0, frames in 1usize..240) {
            let dt = duration / frames as f32;
            let mut age = 0.0f32;
            for frame in 1..=frames {
                age += dt;
                let alive = remaining_life(age, duration).is_some();
                prop_assert_eq!(alive, frame < frames, "frame {} of {}", frame, frames);
            }
        }

        #[test]
        fn active_slots_never_exceed_capacity(capacity in 1usize..64, spawns in 0u32..500) {
            let mut pool = RingPool::<Tag>::new(capacity);
            fill(&mut pool, 0..spawns);
            prop_assert!(pool.active_count() <= capacity);
            prop_assert_eq!(pool.active_count(), capacity.min(spawns as usize));
        }
    }
}
