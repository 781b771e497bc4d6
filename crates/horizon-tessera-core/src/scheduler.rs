//! Deduplicating update queue for deferred, once-per-tick work.
//!
//! Views defer structural rebuilds instead of reacting inline to every
//! change notification: each registered task can be scheduled any number of
//! times within a tick but runs at most once when the queue is pumped. This
//! is the explicit stand-in for posting layout work to a platform message
//! queue.
//!
//! # Example
//!
//! ```
//! use horizon_tessera_core::UpdateQueue;
//!
//! let mut queue = UpdateQueue::new();
//! let id = queue.register(|| println!("layout pass"));
//!
//! // Many notifications in one tick collapse into one pending run.
//! queue.schedule(id).unwrap();
//! queue.schedule(id).unwrap();
//! assert_eq!(queue.pending_count(), 1);
//!
//! assert_eq!(queue.run_pending(), 1);
//! assert_eq!(queue.pending_count(), 0);
//! ```

use parking_lot::Mutex;
use slotmap::{new_key_type, SlotMap};

use crate::error::{Result, UpdateError};

new_key_type! {
    /// A unique identifier for a registered update task.
    pub struct UpdateId;
}

/// A boxed update task closure.
type BoxedUpdateTask = Box<dyn FnMut() + Send + 'static>;

/// Internal registered task data.
struct UpdateTaskData {
    /// The task closure. Taken out of the slot while it runs so a task can
    /// re-enter the queue through a shared handle.
    task: Option<BoxedUpdateTask>,
    /// Whether this task is waiting to run.
    pending: bool,
}

/// A deduplicating scheduler for deferred update tasks.
///
/// Tasks are registered once and scheduled many times; `run_pending`
/// executes each pending task exactly once, in schedule order. The pending
/// mark is cleared before the task runs, so a task may schedule itself again
/// for the next tick.
pub struct UpdateQueue {
    tasks: SlotMap<UpdateId, UpdateTaskData>,
    /// Pending task ids in schedule order.
    run_order: Vec<UpdateId>,
}

impl UpdateQueue {
    /// Create an empty update queue.
    pub fn new() -> Self {
        Self {
            tasks: SlotMap::with_key(),
            run_order: Vec::new(),
        }
    }

    /// Register an update task.
    ///
    /// The task is inert until [`schedule`](Self::schedule) is called with
    /// the returned ID.
    pub fn register<F>(&mut self, task: F) -> UpdateId
    where
        F: FnMut() + Send + 'static,
    {
        self.tasks.insert(UpdateTaskData {
            task: Some(Box::new(task)),
            pending: false,
        })
    }

    /// Remove a registered task.
    ///
    /// A pending run that has not happened yet is cancelled.
    pub fn unregister(&mut self, id: UpdateId) -> Result<()> {
        if self.tasks.remove(id).is_some() {
            self.run_order.retain(|&other| other != id);
            Ok(())
        } else {
            Err(UpdateError::InvalidTaskId.into())
        }
    }

    /// Mark a task as needing to run on the next pump.
    ///
    /// Scheduling an already-pending task is a no-op: no matter how many
    /// notifications arrive within a tick, the task runs once.
    pub fn schedule(&mut self, id: UpdateId) -> Result<()> {
        let Some(data) = self.tasks.get_mut(id) else {
            return Err(UpdateError::InvalidTaskId.into());
        };
        if !data.pending {
            data.pending = true;
            self.run_order.push(id);
            tracing::trace!(target: "horizon_tessera_core::update", ?id, "update scheduled");
        }
        Ok(())
    }

    /// Check whether a task is currently pending.
    pub fn is_pending(&self, id: UpdateId) -> bool {
        self.tasks.get(id).is_some_and(|t| t.pending)
    }

    /// Number of tasks currently pending.
    pub fn pending_count(&self) -> usize {
        self.run_order.len()
    }

    /// Number of registered tasks.
    pub fn registered_count(&self) -> usize {
        self.tasks.len()
    }

    /// Run every task that was pending when the pump started.
    ///
    /// Tasks scheduled from within a running task are left for the next
    /// pump. Returns the number of tasks executed.
    pub fn run_pending(&mut self) -> usize {
        let batch = std::mem::take(&mut self.run_order);
        let mut executed = 0;

        for id in batch {
            let Some(data) = self.tasks.get_mut(id) else {
                continue;
            };
            if !data.pending {
                continue;
            }
            data.pending = false;

            // Take the closure out so the task may call back into the queue
            // (through a shared handle) without aliasing its own slot.
            let Some(mut task) = data.task.take() else {
                continue;
            };

            tracing::trace!(target: "horizon_tessera_core::update", ?id, "running update task");
            task();
            executed += 1;

            // Put the closure back unless the task unregistered itself.
            if let Some(data) = self.tasks.get_mut(id) {
                data.task = Some(task);
            }
        }

        executed
    }
}

impl Default for UpdateQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// A thread-safe wrapper around [`UpdateQueue`] for shared handles.
///
/// The queue lock is never held while a task executes, so tasks are free to
/// schedule themselves (or other tasks) through the same handle.
pub struct SharedUpdateQueue {
    inner: Mutex<UpdateQueue>,
}

impl SharedUpdateQueue {
    /// Create an empty shared update queue.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(UpdateQueue::new()),
        }
    }

    /// See [`UpdateQueue::register`].
    pub fn register<F>(&self, task: F) -> UpdateId
    where
        F: FnMut() + Send + 'static,
    {
        self.inner.lock().register(task)
    }

    /// See [`UpdateQueue::unregister`].
    pub fn unregister(&self, id: UpdateId) -> Result<()> {
        self.inner.lock().unregister(id)
    }

    /// See [`UpdateQueue::schedule`].
    pub fn schedule(&self, id: UpdateId) -> Result<()> {
        self.inner.lock().schedule(id)
    }

    /// See [`UpdateQueue::is_pending`].
    pub fn is_pending(&self, id: UpdateId) -> bool {
        self.inner.lock().is_pending(id)
    }

    /// See [`UpdateQueue::pending_count`].
    pub fn pending_count(&self) -> usize {
        self.inner.lock().pending_count()
    }

    /// Run every task that was pending when the pump started, without
    /// holding the queue lock across task execution.
    ///
    /// Tasks scheduled from within a running task are left for the next
    /// pump, matching [`UpdateQueue::run_pending`].
    pub fn run_pending(&self) -> usize {
        let batch = std::mem::take(&mut self.inner.lock().run_order);
        let mut executed = 0;

        for id in batch {
            // Claim the task under the lock.
            let claimed = {
                let mut queue = self.inner.lock();
                match queue.tasks.get_mut(id) {
                    Some(data) if data.pending => {
                        data.pending = false;
                        data.task.take()
                    }
                    _ => None,
                }
            };

            let Some(mut task) = claimed else {
                continue;
            };

            task();
            executed += 1;

            let mut queue = self.inner.lock();
            if let Some(data) = queue.tasks.get_mut(id) {
                data.task = Some(task);
            }
        }

        executed
    }
}

impl Default for SharedUpdateQueue {
    fn default() -> Self {
        Self::new()
    }
}

static_assertions::assert_impl_all!(SharedUpdateQueue: Send, Sync);
