//! Notifications inbox and achievement progress.

use tracing::debug;

use crate::{
    domain::{Achievement, Notification},
    errors::{OikosError, Result},
    repository::UserRepository,
};

pub struct EngagementService;

impl EngagementService {
    pub fn notify(repo: &UserRepository, notification: &Notification) -> Result<()> {
        repo.save(notification)
    }

    /// Notifications newest first.
    pub fn inbox(repo: &UserRepository) -> Result<Vec<Notification>> {
        let mut notifications: Vec<Notification> = repo.list()?;
        notifications.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(notifications)
    }

    pub fn unread_count(notifications: &[Notification]) -> usize {
        notifications.iter().filter(|n| !n.read).count()
    }

    pub fn mark_read(repo: &UserRepository, id: &str) -> Result<Notification> {
        let mut notification = repo
            .get::<Notification>(id)?
            .ok_or_else(|| OikosError::NotFound(format!("notification `{id}`")))?;
        notification.read = true;
        repo.save(&notification)?;
        Ok(notification)
    }

    /// Marks every unread notification as read in one update; returns how many changed.
    pub fn mark_all_read(repo: &UserRepository) -> Result<usize> {
        let unread: Vec<Notification> = repo
            .list::<Notification>()?
            .into_iter()
            .filter(|n| !n.read)
            .map(|mut n| {
                n.read = true;
                n
            })
            .collect();
        let mut batch = repo.batch();
        for notification in &unread {
            batch = batch.put(notification)?;
        }
        repo.apply(batch)?;
        Ok(unread.len())
    }

    pub fn delete_notification(repo: &UserRepository, id: &str) -> Result<()> {
        repo.delete::<Notification>(id)
    }

    /// Stores new progress for an achievement, creating it when unknown.
    pub fn update_progress(
        repo: &UserRepository,
        id: &str,
        name: &str,
        progress: f64,
    ) -> Result<Achievement> {
        let mut achievement = repo
            .get::<Achievement>(id)?
            .unwrap_or_else(|| Achievement::new(id, name, ""));
        achievement.set_progress(progress);
        repo.save(&achievement)?;
        debug!(achievement = %id, progress = achievement.progress, "achievement progress");
        Ok(achievement)
    }

    pub fn mark_achieved(repo: &UserRepository, id: &str) -> Result<Achievement> {
        let mut achievement = repo
            .get::<Achievement>(id)?
            .ok_or_else(|| OikosError::NotFound(format!("achievement `{id}`")))?;
        achievement.mark_achieved();
        repo.save(&achievement)?;
        Ok(achievement)
    }
}
