use quillpost_core::UserId;

/// Any entity with a single owning user (article, comment, like, account).
///
/// Users at exactly the required role level may only act on resources they own.
pub trait OwnedResource {
    fn owner_id(&self) -> UserId;
}

impl<T: OwnedResource + ?Sized> OwnedResource for &T {
    fn owner_id(&self) -> UserId {
        (**self).owner_id()
    }
}
