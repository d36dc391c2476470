use super::{FacadeContext, StoreFacade};
use crate::action::{Action, ActionKind};
use crate::error::DispatchFault;
use crate::remote::RemoteCollection;
use mirrorkit_model::{MirrorEntity, SitePlugin};
use mirrorkit_storage::{LocalStore, MirrorStore, StorageResult};
use mirrorkit_types::{ScopeId, StableKey};
use std::sync::Arc;

/// Mirror of the plugins installed on each site.
pub struct SitePluginStore<S = MirrorStore> {
    ctx: FacadeContext<S>,
    remote: Arc<dyn RemoteCollection<SitePlugin>>,
}

impl<S: LocalStore> SitePluginStore<S> {
    pub const NAME: &'static str = "site_plugins";

    const KINDS: &'static [ActionKind] = &[ActionKind::FetchSitePlugins, ActionKind::UpdateSitePlugin];

    pub fn new(ctx: FacadeContext<S>, remote: Arc<dyn RemoteCollection<SitePlugin>>) -> Self {
        Self { ctx, remote }
    }

    /// Plugins of a site in the order the remote listed them.
    pub fn get_site_plugins(&self, site: ScopeId) -> StorageResult<Vec<SitePlugin>> {
        self.ctx.store().read_all_for_scope(site)
    }

    pub fn get_site_plugin_by_slug(&self, site: ScopeId, slug: &str) -> StorageResult<Option<SitePlugin>> {
        self.ctx.store().get_by_key(site, &StableKey::slug(slug))
    }

    pub fn get_site_plugin_by_name(&self, site: ScopeId, name: &str) -> StorageResult<Option<SitePlugin>> {
        let plugins = self.get_site_plugins(site)?;
        Ok(plugins.into_iter().find(|p| p.name == name))
    }

    pub fn delete_site_plugin(&self, site: ScopeId, plugin: &SitePlugin) -> StorageResult<usize> {
        self.ctx.store().delete_one::<SitePlugin>(site, &plugin.stable_key())
    }

    /// Removes every plugin of a site, e.g. when the site itself goes away.
    pub fn delete_site_plugins(&self, site: ScopeId) -> StorageResult<usize> {
        self.ctx.store().delete_all_for_scope::<SitePlugin>(site)
    }
}

impl<S: LocalStore> StoreFacade for SitePluginStore<S> {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn handled_kinds(&self) -> &'static [ActionKind] {
        Self::KINDS
    }

    fn on_action(&self, action: &Action) -> Result<(), DispatchFault> {
        self.ctx.ensure_open(Self::NAME)?;
        let ctx = self.ctx.clone();
        let remote = Arc::clone(&self.remote);
        match action {
            Action::FetchSitePlugins(request) => {
                let request = request.clone();
                let page_size = ctx.config().plugin_page_size;
                self.ctx.spawn_request(action, async move {
                    Action::FetchedSitePlugins(ctx.fetch_listing(remote.as_ref(), request, page_size).await)
                });
            }
            Action::UpdateSitePlugin(request) => {
                let request = request.clone();
                self.ctx.spawn_request(action, async move {
                    let outcome = ctx
                        .mutate(remote.as_ref(), request, |r, site, plugin| {
                            r.upsert_single(site, Some(plugin))
                        })
                        .await;
                    Action::UpdatedSitePlugin(outcome)
                });
            }
            other => {
                return Err(DispatchFault::new(format!("{} does not handle {}", Self::NAME, other.kind())));
            }
        }
        Ok(())
    }
}
