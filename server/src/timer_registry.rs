//! Schedules the delayed callbacks engines request via `TimerCommand`
//! (Memory's card-hide, Speed mode deadlines, Mafia's day window). Ported
//! from the teacher's "abort the sibling task" idiom in `processing_module`:
//! setting a timer that is already pending aborts the old one before
//! spawning its replacement, so a replayed `Set` for the same id behaves
//! like a reset rather than a stack of races.

use protocol::RoomCode;
use std::collections::HashMap;
use std::future::Future;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Duration;

#[derive(Default)]
pub struct TimerRegistry {
    handles: Mutex<HashMap<(RoomCode, u32), JoinHandle<()>>>,
}

impl TimerRegistry {
    pub async fn set<F>(&self, room_code: RoomCode, timer_id: u32, duration_ms: u64, on_fire: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let key = (room_code, timer_id);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(duration_ms)).await;
            on_fire.await;
        });
        let previous = {
            let mut handles = self.handles.lock().await;
            handles.insert(key, handle)
        };
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    pub async fn cancel(&self, room_code: &RoomCode, timer_id: u32) {
        let mut handles = self.handles.lock().await;
        if let Some(handle) = handles.remove(&(room_code.clone(), timer_id)) {
            handle.abort();
        }
    }

    pub async fn cancel_all_for_room(&self, room_code: &RoomCode) {
        let mut handles = self.handles.lock().await;
        handles.retain(|(code, _), handle| {
            if code == room_code {
                handle.abort();
                false
            } else {
                true
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc as StdArc;

    #[tokio::test]
    async fn replaying_set_for_the_same_key_aborts_the_previous_timer() {
        let registry = TimerRegistry::default();
        let fired = StdArc::new(AtomicU32::new(0));

        let fired_a = fired.clone();
        registry
            .set("ROOM01".to_string(), 1, 200, async move {
                fired_a.fetch_add(1, Ordering::SeqCst);
            })
            .await;

        let fired_b = fired.clone();
        registry
            .set("ROOM01".to_string(), 1, 10, async move {
                fired_b.fetch_add(100, Ordering::SeqCst);
            })
            .await;

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 100, "only the replacement timer should have fired");
    }

    #[tokio::test]
    async fn cancel_prevents_a_pending_timer_from_firing() {
        let registry = TimerRegistry::default();
        let fired = StdArc::new(AtomicU32::new(0));

        let fired_clone = fired.clone();
        registry
            .set("ROOM02".to_string(), 7, 20, async move {
                fired_clone.fetch_add(1, Ordering::SeqCst);
            })
            .await;
        registry.cancel(&"ROOM02".to_string(), 7).await;

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn cancel_all_for_room_leaves_other_rooms_untouched() {
        let registry = TimerRegistry::default();
        let fired = StdArc::new(AtomicU32::new(0));

        let fired_a = fired.clone();
        registry.set("ROOM03".to_string(), 1, 20, async move { fired_a.fetch_add(1, Ordering::SeqCst); }).await;
        let fired_b = fired.clone();
        registry.set("ROOM04".to_string(), 1, 20, async move { fired_b.fetch_add(1, Ordering::SeqCst); }).await;

        registry.cancel_all_for_room(&"ROOM03".to_string()).await;
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1, "only ROOM04's timer should have fired");
    }
}
