pub mod form;
pub mod notifier;
pub mod table;

pub use form::{FormMode, FormView, SubmitControl};
pub use notifier::{Notice, NoticeKind, Notifier};
pub use table::{Cell, RowAction, TableBody, TableRow, TableView, render_table};
