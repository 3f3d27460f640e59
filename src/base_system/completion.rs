//! 一次性完成信号。
//!
//! 后台任务结束时调用 `complete()`，之前或之后注册的回调都会恰好执行一次，
//! 不需要定时轮询某个标志位。

use std::sync::{Arc, Mutex};

type Callback = Box<dyn FnOnce() + Send + 'static>;

#[derive(Default)]
struct State {
    done: bool,
    callbacks: Vec<Callback>,
}

#[derive(Clone, Default)]
pub struct Completion {
    state: Arc<Mutex<State>>,
}

impl Completion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_complete(&self) -> bool {
        self.state.lock().map(|s| s.done).unwrap_or(false)
    }

    /// 注册回调；若已完成则立即在当前线程执行。
    pub fn on_complete<F>(&self, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        {
            let Ok(mut state) = self.state.lock() else {
                return;
            };
            if !state.done {
                state.callbacks.push(Box::new(callback));
                return;
            }
        }
        callback();
    }

    /// 标记完成并执行已注册的回调（按注册顺序）。重复调用无效果。
    pub fn complete(&self) {
        let callbacks = {
            let Ok(mut state) = self.state.lock() else {
                return;
            };
            if state.done {
                return;
            }
            state.done = true;
            std::mem::take(&mut state.callbacks)
        };
        for callback in callbacks {
            callback();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[test]
    fn callbacks_run_in_order_once() {
        let done = Completion::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        for i in 0..3 {
            let log = Arc::clone(&log);
            done.on_complete(move || log.lock().unwrap().push(i));
        }
        assert!(log.lock().unwrap().is_empty());

        done.complete();
        done.complete();
        assert_eq!(*log.lock().unwrap(), vec![0, 1, 2]);
        assert!(done.is_complete());
    }

    #[test]
    fn late_registration_runs_immediately() {
        let done = Completion::new();
        done.complete();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        done.on_complete(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn completes_from_worker_thread() {
        let done = Completion::new();
        let (tx, rx) = crossbeam_channel::bounded(1);
        done.on_complete(move || {
            let _ = tx.send("scanned");
        });

        let worker = done.clone();
        thread::spawn(move || worker.complete()).join().unwrap();
        assert_eq!(rx.recv().unwrap(), "scanned");
    }

    #[test]
    fn callback_may_register_another() {
        let done = Completion::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let inner_done = done.clone();
        let counter = Arc::clone(&hits);
        done.on_complete(move || {
            let counter = Arc::clone(&counter);
            inner_done.on_complete(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        });
        done.complete();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
