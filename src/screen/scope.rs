//! 页面作用域
//!
//! 页面启动的后台任务都挂在 [`ScreenScope`] 上，页面销毁（drop）时统一中止。

use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

#[derive(Default)]
pub struct ScreenScope {
    tasks: Mutex<Vec<JoinHandle<()>>>,
    named: Mutex<HashMap<&'static str, JoinHandle<()>>>,
}

impl ScreenScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(future);
        let mut tasks = self.tasks.lock();
        tasks.retain(|t| !t.is_finished());
        tasks.push(handle);
    }

    /// 同名任务只保留最新的一个，旧任务被中止
    pub fn spawn_named<F>(&self, name: &'static str, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(future);
        if let Some(previous) = self.named.lock().insert(name, handle) {
            previous.abort();
        }
    }

    /// 中止指定名称的任务
    pub fn cancel(&self, name: &str) {
        if let Some(task) = self.named.lock().remove(name) {
            task.abort();
        }
    }

    /// 仍在运行的任务数
    pub fn active_tasks(&self) -> usize {
        let running = self.tasks.lock().iter().filter(|t| !t.is_finished()).count();
        running + self.named.lock().values().filter(|t| !t.is_finished()).count()
    }

    pub fn cancel_all(&self) {
        for task in self.tasks.lock().drain(..) {
            task.abort();
        }
        for (_, task) in self.named.lock().drain() {
            task.abort();
        }
    }
}

impl Drop for ScreenScope {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

/// 把一个观察通道的值持续写入页面状态
pub fn forward<T, S, F>(
    mut source: watch::Receiver<T>,
    state: Arc<watch::Sender<S>>,
    apply: F,
) -> impl Future<Output = ()> + Send + 'static
where
    T: Clone + Send + Sync + 'static,
    S: Send + Sync + 'static,
    F: Fn(&mut S, T) + Send + Sync + 'static,
{
    async move {
        while source.changed().await.is_ok() {
            let value = source.borrow_and_update().clone();
            state.send_modify(|s| apply(s, value));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn dropping_scope_aborts_tasks() {
        let (tx, rx) = watch::channel(0u32);
        let scope = ScreenScope::new();
        let mut rx_task = rx.clone();
        scope.spawn(async move {
            while rx_task.changed().await.is_ok() {}
        });
        assert_eq!(scope.active_tasks(), 1);

        drop(scope);
        // 任务被中止后它持有的接收端也被释放
        tokio::time::timeout(Duration::from_secs(5), async {
            while tx.receiver_count() > 1 {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();
        drop(rx);
    }

    #[tokio::test]
    async fn named_task_replaces_previous() {
        let scope = ScreenScope::new();
        scope.spawn_named("observer", std::future::pending());
        scope.spawn_named("observer", std::future::pending());
        assert_eq!(scope.named.lock().len(), 1);
        assert_eq!(scope.active_tasks(), 1);
    }

    #[tokio::test]
    async fn cancel_stops_only_the_named_task() {
        let scope = ScreenScope::new();
        scope.spawn(std::future::pending());
        scope.spawn_named("observer", std::future::pending());
        assert_eq!(scope.active_tasks(), 2);

        scope.cancel("observer");
        assert!(scope.named.lock().is_empty());
        assert_eq!(scope.active_tasks(), 1);

        scope.cancel("missing");
        assert_eq!(scope.active_tasks(), 1);
    }

    #[tokio::test]
    async fn forward_applies_updates() {
        let (source_tx, source_rx) = watch::channel(1u32);
        let state = Arc::new(watch::Sender::new(0u32));
        let mut observed = state.subscribe();

        let scope = ScreenScope::new();
        scope.spawn(forward(source_rx, state.clone(), |s, v| *s = v * 10));

        source_tx.send(2).unwrap();
        tokio::time::timeout(Duration::from_secs(5), observed.wait_for(|v| *v == 20))
            .await
            .unwrap()
            .unwrap();
    }
}
