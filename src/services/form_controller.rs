use chrono::{Local, NaiveDate};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::error::AppError;
use crate::models::{Entity, Record, RecordId};
use crate::services::gateway::Gateway;
use crate::validation::{EntityDescriptor, FormValues, ValidationError};
use crate::view::{FormView, Notice, Notifier, SubmitControl, TableView, render_table};

/// Source of "today" for age checks.
pub type Today = fn() -> NaiveDate;

pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// Everything a page shows for one entity.
#[derive(Debug, Clone, Serialize)]
pub struct PageView {
    pub form: FormView,
    pub table: TableView,
    pub notice: Option<Notice>,
}

/// Create/edit state machine for one entity form.
///
/// Holds at most one edit target. Every remote failure is turned into a
/// notice and handed back to the caller; the form keeps its values and the
/// table keeps the last data that loaded successfully.
pub struct FormController<T: Entity> {
    gateway: Gateway<T>,
    notifier: Notifier,
    edit_target: Option<Record<T>>,
    form: FormView,
    table: TableView,
    submit_tx: watch::Sender<SubmitControl>,
    today: Today,
}

impl<T: Entity> FormController<T> {
    pub fn new(gateway: Gateway<T>, notifier: Notifier) -> Self {
        let form = FormView::create_mode(T::descriptor());
        let (submit_tx, _rx) = watch::channel(form.submit.clone());
        Self {
            gateway,
            notifier,
            edit_target: None,
            form,
            table: TableView::empty(T::descriptor()),
            submit_tx,
            today: local_today,
        }
    }

    pub fn with_today(mut self, today: Today) -> Self {
        self.today = today;
        self
    }

    pub fn edit_target(&self) -> Option<&Record<T>> {
        self.edit_target.as_ref()
    }

    pub fn form(&self) -> &FormView {
        &self.form
    }

    pub fn table(&self) -> &TableView {
        &self.table
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Watch the submit control; it is disabled with a "saving" caption while
    /// a create or update is in flight.
    pub fn subscribe_submit(&self) -> watch::Receiver<SubmitControl> {
        self.submit_tx.subscribe()
    }

    pub fn is_saving(&self) -> bool {
        !self.form.submit.enabled
    }

    pub fn page(&self) -> PageView {
        PageView {
            form: self.form.clone(),
            table: self.table.clone(),
            notice: self.notifier.current(),
        }
    }

    pub fn begin_edit(&mut self, record: Record<T>) {
        let d = T::descriptor();
        self.form = FormView::edit_mode(d, record.id, record.data.form_values());
        self.edit_target = Some(record);
        self.publish_submit();
    }

    /// Row "edit" action: loads the current version of the record first.
    pub async fn edit_by_id(&mut self, id: RecordId) -> Result<(), AppError> {
        match self.gateway.get(id).await {
            Ok(record) => {
                self.begin_edit(record);
                Ok(())
            }
            Err(err) => {
                error!("failed to load {} {}: {}", T::descriptor().table, id, err);
                self.notifier
                    .error(format!("Error al cargar el {}", T::descriptor().lower_singular()));
                Err(err)
            }
        }
    }

    pub fn cancel_edit(&mut self) {
        self.edit_target = None;
        self.form = FormView::create_mode(T::descriptor());
        self.publish_submit();
    }

    pub async fn submit(&mut self, values: FormValues) -> Result<Record<T>, AppError> {
        if self.is_saving() {
            return Err(AppError::SaveInProgress);
        }

        let d = T::descriptor();
        self.form.values = values;

        let entity = match self.validated() {
            Ok(entity) => entity,
            Err(err) => {
                info!("{} form rejected: {}", d.table, err);
                self.notifier.error(err.to_string());
                return Err(err);
            }
        };

        let target = self.edit_target.as_ref().map(|r| r.id);
        let result = {
            let _saving = SavingGuard::engage(&mut self.form, &self.submit_tx, d);
            // The write runs to completion even if this future is dropped.
            let gateway = self.gateway.clone();
            let save = tokio::spawn(async move {
                match target {
                    None => gateway.create(&entity).await,
                    Some(id) => gateway.update(id, &entity).await,
                }
            });
            save.await
                .unwrap_or_else(|e| Err(AppError::Store(format!("save task failed: {}", e))))
        };

        match result {
            Ok(record) => {
                let verb = if target.is_some() { "actualizado" } else { "registrado" };
                self.notifier
                    .success(format!("{} {} exitosamente", d.singular, verb));
                self.cancel_edit();
                if let Err(err) = self.reload().await {
                    warn!("reload after save failed: {}", err);
                }
                Ok(record)
            }
            Err(err) => {
                error!("failed to save {}: {}", d.lower_singular(), err);
                self.notifier.error(format!(
                    "Error al guardar el {}: {}",
                    d.lower_singular(),
                    err
                ));
                Err(err)
            }
        }
    }

    /// Full reload from the store; the previous table stays on failure.
    pub async fn reload(&mut self) -> Result<(), AppError> {
        match self.gateway.list().await {
            Ok(records) => {
                self.table = render_table(&records);
                Ok(())
            }
            Err(err) => {
                error!("failed to load {}: {}", T::descriptor().table, err);
                self.notifier
                    .error(format!("Error al cargar los {}", T::descriptor().plural));
                Err(err)
            }
        }
    }

    pub async fn search(&mut self, term: &str) -> Result<(), AppError> {
        if term.trim().is_empty() {
            return self.reload().await;
        }

        match self.gateway.search(term).await {
            Ok(records) => {
                self.table = render_table(&records);
                Ok(())
            }
            Err(err) => {
                error!("search in {} failed: {}", T::descriptor().table, err);
                self.notifier
                    .error(format!("Error al buscar {}", T::descriptor().plural));
                Err(err)
            }
        }
    }

    /// Deletes a record the user already confirmed.
    pub async fn delete(&mut self, id: RecordId) -> Result<(), AppError> {
        let d = T::descriptor();
        match self.gateway.delete(id).await {
            Ok(()) => {
                self.notifier
                    .success(format!("{} eliminado exitosamente", d.singular));
                if self.edit_target.as_ref().is_some_and(|r| r.id == id) {
                    self.cancel_edit();
                }
                if let Err(err) = self.reload().await {
                    warn!("reload after delete failed: {}", err);
                }
                Ok(())
            }
            Err(err) => {
                error!("failed to delete {} {}: {}", d.table, id, err);
                self.notifier
                    .error(format!("Error al eliminar el {}", d.lower_singular()));
                Err(err)
            }
        }
    }

    fn validated(&self) -> Result<T, AppError> {
        let row = T::descriptor().validate(&self.form.values, (self.today)())?;
        serde_json::from_value(Value::Object(row)).map_err(|e| {
            AppError::Validation(ValidationError::new(
                "",
                format!("Datos del formulario no válidos: {}", e),
            ))
        })
    }

    fn publish_submit(&self) {
        self.submit_tx.send_replace(self.form.submit.clone());
    }
}

/// Holds the submit control in its saving state; dropping it restores the
/// idle caption, whether the save finished or the caller went away.
struct SavingGuard<'a> {
    form: &'a mut FormView,
    submit_tx: &'a watch::Sender<SubmitControl>,
    idle_caption: String,
}

impl<'a> SavingGuard<'a> {
    fn engage(
        form: &'a mut FormView,
        submit_tx: &'a watch::Sender<SubmitControl>,
        descriptor: &EntityDescriptor,
    ) -> Self {
        let idle_caption = form.idle_caption(descriptor);
        form.submit = SubmitControl::saving();
        submit_tx.send_replace(form.submit.clone());
        Self {
            form,
            submit_tx,
            idle_caption,
        }
    }
}

impl Drop for SavingGuard<'_> {
    fn drop(&mut self) {
        self.form.submit = SubmitControl::idle(std::mem::take(&mut self.idle_caption));
        self.submit_tx.send_replace(self.form.submit.clone());
    }
}
