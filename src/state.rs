use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::warn;

use crate::models::{Course, Entity, Professor, Student};
use crate::services::{FormController, Gateway};
use crate::store::RemoteStore;
use crate::view::Notifier;

pub type SharedController<T> = Arc<Mutex<FormController<T>>>;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RemoteStore>,
    pub students: SharedController<Student>,
    pub courses: SharedController<Course>,
    pub professors: SharedController<Professor>,
}

impl AppState {
    /// One controller and one notifier per entity page.
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self {
            students: controller(&store),
            courses: controller(&store),
            professors: controller(&store),
            store,
        }
    }

    pub async fn load_all(&self) {
        if let Err(e) = self.students.lock().await.reload().await {
            warn!("initial load of students failed: {}", e);
        }
        if let Err(e) = self.courses.lock().await.reload().await {
            warn!("initial load of courses failed: {}", e);
        }
        if let Err(e) = self.professors.lock().await.reload().await {
            warn!("initial load of professors failed: {}", e);
        }
    }
}

fn controller<T: Entity>(store: &Arc<dyn RemoteStore>) -> SharedController<T> {
    let gateway = Gateway::new(store.clone());
    Arc::new(Mutex::new(FormController::new(gateway, Notifier::new())))
}
