use sbm_common::view::{BootConfigView, ErrorDialog, MachineView, VariableView};
use sbm_common::{ApiError, Resource, ResourceKind};
use tracing::debug;

use crate::client::ResourceClient;

/// Receives everything the console loads.
///
/// Implementations decide how lists, records and errors are displayed.
pub trait Presenter {
    fn render_list(&mut self, kind: ResourceKind, items: &[String]);
    fn render_boot_config(&mut self, view: BootConfigView);
    fn render_machine(&mut self, view: MachineView);
    fn render_variable(&mut self, view: VariableView);
    fn show_error(&mut self, dialog: ErrorDialog);
}

/// Dispatches one request per user action and delivers the result to a
/// [`Presenter`].
///
/// Every `load_*` method reports failures to [`Presenter::show_error`]
/// before returning the same error, so callers only need the `Result` to
/// decide whether to carry on.
pub struct Console<P> {
    client: ResourceClient,
    presenter: P,
}

impl<P: Presenter> Console<P> {
    pub fn new(client: ResourceClient, presenter: P) -> Self {
        Self { client, presenter }
    }

    pub fn client(&self) -> &ResourceClient {
        &self.client
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    pub fn into_presenter(self) -> P {
        self.presenter
    }

    /// Loads and renders every collection, the way the console page does on
    /// load. Each collection is requested even when an earlier one failed;
    /// the first failure is returned once all have been tried.
    pub async fn load_all(&mut self) -> Result<(), ApiError> {
        let mut first_error = None;
        for kind in ResourceKind::ALL {
            if let Err(err) = self.load_list(kind).await {
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    pub async fn load_list(&mut self, kind: ResourceKind) -> Result<(), ApiError> {
        debug!("Loading {} list", kind);
        let items = self.client.list(kind).await;
        let items = self.report(items)?;
        self.presenter.render_list(kind, &items);
        Ok(())
    }

    /// Loads one record, as when an entry in a list is selected.
    pub async fn load_item(&mut self, kind: ResourceKind, key: &str) -> Result<(), ApiError> {
        debug!("Loading {} '{}'", kind, key);
        match kind {
            ResourceKind::BootConfig => {
                let record = self.client.boot_config(key).await;
                let record = self.report(record)?;
                self.presenter.render_boot_config(record.into());
            }
            ResourceKind::Machine => {
                let record = self.client.machine(key).await;
                let record = self.report(record)?;
                self.presenter.render_machine(record.into());
            }
            ResourceKind::Variable => {
                let record = self.client.variable(key).await;
                let record = self.report(record)?;
                self.presenter.render_variable(record.into());
            }
        }
        Ok(())
    }

    /// Creates or replaces `record`, then refreshes its collection.
    pub async fn submit<R: Resource>(&mut self, record: &R) -> Result<(), ApiError> {
        let items = self.client.list(R::KIND).await;
        let exists = self.report(items)?.iter().any(|k| k == record.key());
        let written = if exists {
            self.client.update(record).await.map(|_| ())
        } else {
            self.client.create(record).await.map(|_| ())
        };
        self.report(written)?;
        self.load_list(R::KIND).await
    }

    pub async fn remove(&mut self, kind: ResourceKind, key: &str) -> Result<(), ApiError> {
        let deleted = self.client.delete(kind, key).await;
        self.report(deleted)?;
        self.load_list(kind).await
    }

    fn report<T>(&mut self, result: Result<T, ApiError>) -> Result<T, ApiError> {
        result.map_err(|err| {
            self.presenter.show_error(ErrorDialog::from(&err));
            err
        })
    }
}
