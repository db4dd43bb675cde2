//! Two-step "confirm in place" deletion for list rows.
//!
//! The first click marks a row; only a second, explicit confirmation deletes
//! it. At most one row is awaiting confirmation at a time.

use std::future::Future;

use campus_core::AppError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteConfirmation<K> {
    pending: Option<K>,
}

impl<K> Default for DeleteConfirmation<K> {
    fn default() -> Self {
        Self { pending: None }
    }
}

impl<K: PartialEq> DeleteConfirmation<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for confirmation on `key`, replacing any other pending row.
    pub fn request(&mut self, key: K) {
        self.pending = Some(key);
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Take the confirmed key, leaving nothing pending.
    pub fn confirm(&mut self) -> Option<K> {
        self.pending.take()
    }

    pub fn is_pending(&self, key: &K) -> bool {
        self.pending.as_ref() == Some(key)
    }

    pub fn pending(&self) -> Option<&K> {
        self.pending.as_ref()
    }
}

/// Remove the first item matching `matches` and return it with its position.
pub fn remove_optimistically<T>(
    items: &mut Vec<T>,
    matches: impl Fn(&T) -> bool,
) -> Option<(usize, T)> {
    let index = items.iter().position(matches)?;
    Some((index, items.remove(index)))
}

/// Delete the row awaiting confirmation.
///
/// The row disappears from `items` before the backend answers and is put
/// back at its old position if the deletion fails. Returns `Ok(None)` when
/// nothing was pending.
pub async fn confirm_and_delete<T, K, F, Fut>(
    confirmation: &mut DeleteConfirmation<K>,
    items: &mut Vec<T>,
    key_of: impl Fn(&T) -> K,
    delete: F,
) -> Result<Option<T>, AppError>
where
    K: PartialEq,
    F: FnOnce(K) -> Fut,
    Fut: Future<Output = Result<(), AppError>>,
{
    let Some(key) = confirmation.confirm() else {
        return Ok(None);
    };

    let removed = remove_optimistically(items, |item| key_of(item) == key);
    match delete(key).await {
        Ok(()) => Ok(removed.map(|(_, item)| item)),
        Err(e) => {
            if let Some((index, item)) = removed {
                items.insert(index.min(items.len()), item);
            }
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_one_row_pending() {
        let mut confirmation = DeleteConfirmation::new();
        confirmation.request(1);
        confirmation.request(2);
        assert!(!confirmation.is_pending(&1));
        assert!(confirmation.is_pending(&2));

        confirmation.cancel();
        assert_eq!(confirmation.pending(), None);
    }

    #[tokio::test]
    async fn test_nothing_pending_deletes_nothing() {
        let mut confirmation = DeleteConfirmation::<i64>::new();
        let mut items = vec![1, 2, 3];
        let mut called = false;
        let result = confirm_and_delete(&mut confirmation, &mut items, |i| *i, |_| {
            called = true;
            async { Ok::<(), AppError>(()) }
        })
        .await
        .unwrap();
        assert_eq!(result, None);
        assert!(!called);
        assert_eq!(items, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_successful_delete_removes_row() {
        let mut confirmation = DeleteConfirmation::new();
        confirmation.request(2);
        let mut items = vec![1, 2, 3];

        let removed = confirm_and_delete(&mut confirmation, &mut items, |i| *i, |_| async {
            Ok::<(), AppError>(())
        })
        .await
        .unwrap();

        assert_eq!(removed, Some(2));
        assert_eq!(items, vec![1, 3]);
        assert_eq!(confirmation.pending(), None);
    }

    #[tokio::test]
    async fn test_failed_delete_restores_row_in_place() {
        let mut confirmation = DeleteConfirmation::new();
        confirmation.request(2);
        let mut items = vec![1, 2, 3];

        let err = confirm_and_delete(&mut confirmation, &mut items, |i| *i, |_| async {
            Err::<(), AppError>(AppError::from_status(500, None))
        })
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::Server(_)));
        assert_eq!(items, vec![1, 2, 3]);
    }
}
