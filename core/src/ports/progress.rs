pub trait Progress: Send + Sync {
    /// Called once per attempted request, whatever its outcome.
    fn increment_requests(&self);
}
