use std::sync::Arc;

use crate::view::JobRow;

/// Surface the dashboard is drawn on.
pub trait Renderer: Send + Sync + 'static {
    /// Write a display string into the element `id`. `None` shows the placeholder.
    fn set_text(&self, id: &str, value: Option<&str>);

    /// Clear the jobs table and fill it with `rows`, in order.
    fn replace_jobs(&self, rows: Vec<JobRow>);
}

impl<R: Renderer + ?Sized> Renderer for Arc<R> {
    fn set_text(&self, id: &str, value: Option<&str>) {
        (**self).set_text(id, value)
    }

    fn replace_jobs(&self, rows: Vec<JobRow>) {
        (**self).replace_jobs(rows)
    }
}
