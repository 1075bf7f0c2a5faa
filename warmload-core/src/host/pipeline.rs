//! 加载完成观察者列表（参考实现）

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use warmload_log::{debug, trace, Logger};

use super::{Disposition, LoadEvent, LoadObserver, LoadPipeline, ObserverId, Priority};

struct Registration {
    id: ObserverId,
    priority: Priority,
    observer: Arc<dyn LoadObserver>,
}

/// 一次分发的结果
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// 按运行顺序排列的观察者名称
    pub ran: Vec<String>,
    /// 返回 `Handled` 的观察者（若有），其后的观察者都没有运行
    pub handled_by: Option<String>,
}

impl DispatchReport {
    pub fn was_handled(&self) -> bool {
        self.handled_by.is_some()
    }
}

/// 有序的观察者列表
///
/// 排序规则：优先级升序，同优先级按注册先后。分发前先复制一份列表再释放锁，
/// 因此观察者内部可以注册/注销观察者，或者再次触发分发。
pub struct ObserverPipeline {
    observers: Mutex<Vec<Registration>>,
    next_id: AtomicU64,
    logger: Arc<Logger>,
}

impl ObserverPipeline {
    pub fn new() -> Self {
        Self::with_logger(Logger::noop())
    }

    pub fn with_logger(logger: Arc<Logger>) -> Self {
        Self {
            observers: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
            logger,
        }
    }

    fn observers(&self) -> MutexGuard<'_, Vec<Registration>> {
        self.observers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// 依次调用观察者，直到某个观察者返回 `Handled`
    pub fn dispatch(&self, event: &LoadEvent) -> DispatchReport {
        let snapshot: Vec<Arc<dyn LoadObserver>> = self
            .observers()
            .iter()
            .map(|r| Arc::clone(&r.observer))
            .collect();

        let mut report = DispatchReport::default();
        for observer in snapshot {
            let name = observer.name().to_string();
            let disposition = observer.on_load(event);
            trace!(self.logger, "observer {} -> {:?}", name, disposition);
            report.ran.push(name.clone());

            if disposition == Disposition::Handled {
                debug!(
                    self.logger,
                    "load of {} handled by {}; remaining after-load actions suppressed",
                    event
                        .path()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "<unknown>".to_string()),
                    name
                );
                report.handled_by = Some(name);
                break;
            }
        }
        report
    }

    /// 当前注册的观察者名称（按运行顺序）
    pub fn names(&self) -> Vec<String> {
        self.observers()
            .iter()
            .map(|r| r.observer.name().to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.observers().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ObserverPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadPipeline for ObserverPipeline {
    fn register(&self, priority: Priority, observer: Arc<dyn LoadObserver>) -> ObserverId {
        let id = ObserverId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut observers = self.observers();
        // id 单调递增，所以插在第一个优先级更大的位置即可保持注册先后
        let index = observers
            .iter()
            .position(|r| r.priority > priority)
            .unwrap_or(observers.len());
        observers.insert(
            index,
            Registration {
                id,
                priority,
                observer,
            },
        );
        id
    }

    fn unregister(&self, id: ObserverId) -> bool {
        let mut observers = self.observers();
        let before = observers.len();
        observers.retain(|r| r.id != id);
        observers.len() != before
    }
}

struct FnObserver<F> {
    name: String,
    f: F,
}

impl<F> LoadObserver for FnObserver<F>
where
    F: Fn(&LoadEvent) -> Disposition + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn on_load(&self, event: &LoadEvent) -> Disposition {
        (self.f)(event)
    }
}

/// 用闭包构造观察者（宿主的普通"加载后"动作）
pub fn observer<F>(name: impl Into<String>, f: F) -> Arc<dyn LoadObserver>
where
    F: Fn(&LoadEvent) -> Disposition + Send + Sync + 'static,
{
    Arc::new(FnObserver {
        name: name.into(),
        f,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn pass(name: &str) -> Arc<dyn LoadObserver> {
        observer(name, |_| Disposition::PassThrough)
    }

    #[test]
    fn test_priority_then_registration_order() {
        let pipeline = ObserverPipeline::new();
        pipeline.register(Priority::DEFAULT, pass("b"));
        pipeline.register(Priority::new(10), pass("d"));
        pipeline.register(Priority::DEFAULT, pass("c"));
        pipeline.register(Priority::new(-1), pass("a"));

        assert_eq!(pipeline.names(), vec!["a", "b", "c", "d"]);

        let report = pipeline.dispatch(&LoadEvent::new("/x.el"));
        assert_eq!(report.ran, vec!["a", "b", "c", "d"]);
        assert!(!report.was_handled());
    }

    #[test]
    fn test_handled_stops_dispatch() {
        let pipeline = ObserverPipeline::new();
        pipeline.register(Priority::DEFAULT, pass("after-load"));
        pipeline.register(
            Priority::INTERCEPTOR,
            observer("hook", |_| Disposition::Handled),
        );

        let report = pipeline.dispatch(&LoadEvent::new("/x.el"));
        assert_eq!(report.ran, vec!["hook"]);
        assert_eq!(report.handled_by.as_deref(), Some("hook"));
    }

    #[test]
    fn test_earliest_host_observer_still_runs_after_hook() {
        let pipeline = ObserverPipeline::new();
        pipeline.register(Priority::new(i32::MIN), pass("host-early"));
        pipeline.register(
            Priority::INTERCEPTOR,
            observer("hook", |_| Disposition::PassThrough),
        );
        pipeline.register(Priority::new(i32::MIN), pass("host-late"));

        assert_eq!(pipeline.names(), vec!["hook", "host-early", "host-late"]);
    }

    #[test]
    fn test_unregister() {
        let pipeline = ObserverPipeline::new();
        let id = pipeline.register(Priority::DEFAULT, pass("a"));

        assert!(pipeline.unregister(id));
        assert!(!pipeline.unregister(id));
        assert!(pipeline.is_empty());
    }

    #[test]
    fn test_observer_may_reenter_pipeline() {
        let pipeline = Arc::new(ObserverPipeline::new());
        let registered = Arc::new(AtomicUsize::new(0));

        let inner = Arc::clone(&pipeline);
        let counter = Arc::clone(&registered);
        pipeline.register(
            Priority::DEFAULT,
            observer("registrar", move |_| {
                inner.register(Priority::new(5), pass("late"));
                counter.fetch_add(1, Ordering::SeqCst);
                Disposition::PassThrough
            }),
        );

        let report = pipeline.dispatch(&LoadEvent::new("/x.el"));

        // 快照之后注册的观察者不参与本次分发
        assert_eq!(report.ran, vec!["registrar"]);
        assert_eq!(pipeline.len(), 2);
        assert_eq!(registered.load(Ordering::SeqCst), 1);
    }
}
