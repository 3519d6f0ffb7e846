use std::collections::HashSet;
use std::fmt;
use std::sync::Mutex;

/// Marks a generated type as observation-capable and exposes its registrar.
pub trait Observable {
    fn registrar(&self) -> &ObservationRegistrar;
}

/// Records field reads and mutations so interested consumers can react to
/// changes.
///
/// Observation is one-shot: reads performed inside [`tracking`]'s `apply`
/// closure register the accessed keys, and the next mutation of any of them
/// fires `on_change` exactly once, before the mutation body runs.
///
/// Safe to use from multiple execution contexts. No internal lock is held
/// while `apply`, `on_change`, or mutation bodies run, so callbacks may
/// re-enter the registrar.
///
/// [`tracking`]: ObservationRegistrar::tracking
pub struct ObservationRegistrar {
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    next_frame_id: u64,
    frames: Vec<Frame>,
    observers: Vec<Observer>,
}

/// An open tracking scope collecting accessed keys.
struct Frame {
    id: u64,
    accessed: HashSet<String>,
}

/// An armed one-shot observer.
struct Observer {
    keys: HashSet<String>,
    on_change: Box<dyn FnOnce(&str) + Send>,
}

/// Closes a tracking frame even when the apply closure unwinds.
struct FrameGuard<'a> {
    registrar: &'a ObservationRegistrar,
    id: u64,
}

impl FrameGuard<'_> {
    fn finish(self) -> HashSet<String> {
        let accessed = self.registrar.remove_frame(self.id);
        std::mem::forget(self);
        accessed
    }
}

impl Drop for FrameGuard<'_> {
    fn drop(&mut self) {
        self.registrar.remove_frame(self.id);
    }
}

impl ObservationRegistrar {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
        }
    }

    /// Records a read of `key` into every open tracking frame.
    pub fn access(&self, key: &str) {
        let mut state = self.state.lock().unwrap();
        for frame in &mut state.frames {
            frame.accessed.insert(key.to_string());
        }
    }

    /// Runs `mutation` with `key` marked as changing, returning its value
    /// unchanged. Observers tracking `key` fire first and are disarmed.
    pub fn with_mutation<R>(&self, key: &str, mutation: impl FnOnce() -> R) -> R {
        let fired = {
            let mut state = self.state.lock().unwrap();
            let mut fired = Vec::new();
            let mut index = 0;
            while index < state.observers.len() {
                if state.observers[index].keys.contains(key) {
                    fired.push(state.observers.swap_remove(index));
                } else {
                    index += 1;
                }
            }
            fired
        };

        for observer in fired {
            (observer.on_change)(key);
        }

        mutation()
    }

    /// Runs `apply`, recording every key accessed through this registrar,
    /// then arms `on_change` to fire on the next mutation of any recorded
    /// key. Returns `apply`'s value. If `apply` accesses nothing, no
    /// observer is armed.
    pub fn tracking<R>(
        &self,
        apply: impl FnOnce() -> R,
        on_change: impl FnOnce(&str) + Send + 'static,
    ) -> R {
        let id = {
            let mut state = self.state.lock().unwrap();
            let id = state.next_frame_id;
            state.next_frame_id += 1;
            state.frames.push(Frame {
                id,
                accessed: HashSet::new(),
            });
            id
        };

        let frame = FrameGuard { registrar: self, id };
        let value = apply();
        let accessed = frame.finish();

        if !accessed.is_empty() {
            let mut state = self.state.lock().unwrap();
            state.observers.push(Observer {
                keys: accessed,
                on_change: Box::new(on_change),
            });
        }

        value
    }

    fn remove_frame(&self, id: u64) -> HashSet<String> {
        let mut state = self.state.lock().unwrap();
        match state.frames.iter().position(|frame| frame.id == id) {
            Some(position) => state.frames.remove(position).accessed,
            None => HashSet::new(),
        }
    }

    #[cfg(test)]
    fn open_frames(&self) -> usize {
        self.state.lock().unwrap().frames.len()
    }
}

impl Default for ObservationRegistrar {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ObservationRegistrar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservationRegistrar").finish_non_exhaustive()
    }
}
