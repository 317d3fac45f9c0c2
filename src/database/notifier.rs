//! 表变更通知
//!
//! 写操作在提交后广播变更的表，观察者据此重新查询。

use tokio::sync::broadcast;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableChange {
    Library,
    SearchHistory,
    RecentGames,
    GameNotes,
}

const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
pub struct ChangeNotifier {
    tx: broadcast::Sender<TableChange>,
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeNotifier {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn notify(&self, change: TableChange) {
        // 没有订阅者时发送失败，忽略即可
        let _ = self.tx.send(change);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TableChange> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_changes() {
        let notifier = ChangeNotifier::new();
        notifier.notify(TableChange::GameNotes);

        let mut rx = notifier.subscribe();
        notifier.notify(TableChange::Library);
        assert_eq!(rx.recv().await.unwrap(), TableChange::Library);
    }
}
