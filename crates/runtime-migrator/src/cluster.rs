//! Read access to a runtime cluster
//!
//! The migrator backs up RBAC and OIDC objects from each runtime cluster
//! before the shoot changes ownership. Connections use a short-lived admin
//! kubeconfig issued by Gardener.

use async_trait::async_trait;
use k8s_openapi::api::rbac::v1::ClusterRoleBinding;
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use kube::api::{ApiResource, DynamicObject, GroupVersionKind, ListParams};
use kube::{Api, Client};
use runtime_common::Result;
use tracing::debug;

use crate::kubeconfig::{client_from_kubeconfig, AdminKubeconfigProvider};

/// CRD name of Gardener's OIDC authenticator objects
pub const OPENID_CONNECT_CRD: &str = "openidconnects.authentication.gardener.cloud";

/// Reads the objects a backup captures
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RuntimeClusterReader: Send + Sync {
    /// All cluster role bindings
    async fn cluster_role_bindings(&self) -> Result<Vec<ClusterRoleBinding>>;

    /// Whether the OIDC authenticator CRD is installed
    async fn oidc_crd_installed(&self) -> Result<bool>;

    /// All OIDC authenticator objects
    async fn openid_connects(&self) -> Result<Vec<DynamicObject>>;
}

/// Opens readers for runtime clusters
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RuntimeClusterConnector: Send + Sync {
    /// Reader for the cluster behind the named shoot
    async fn connect(&self, shoot_name: &str) -> Result<Box<dyn RuntimeClusterReader>>;
}

/// Reader backed by a kube client
pub struct KubeRuntimeCluster {
    client: Client,
}

impl KubeRuntimeCluster {
    /// Reader using the given client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn openid_connect_resource() -> ApiResource {
        let gvk = GroupVersionKind::gvk("authentication.gardener.cloud", "v1alpha1", "OpenIDConnect");
        ApiResource::from_gvk_with_plural(&gvk, "openidconnects")
    }
}

#[async_trait]
impl RuntimeClusterReader for KubeRuntimeCluster {
    async fn cluster_role_bindings(&self) -> Result<Vec<ClusterRoleBinding>> {
        let api: Api<ClusterRoleBinding> = Api::all(self.client.clone());
        Ok(api.list(&ListParams::default()).await?.items)
    }

    async fn oidc_crd_installed(&self) -> Result<bool> {
        let api: Api<CustomResourceDefinition> = Api::all(self.client.clone());
        Ok(api.get_opt(OPENID_CONNECT_CRD).await?.is_some())
    }

    async fn openid_connects(&self) -> Result<Vec<DynamicObject>> {
        let resource = Self::openid_connect_resource();
        let api: Api<DynamicObject> = Api::all_with(self.client.clone(), &resource);
        Ok(api.list(&ListParams::default()).await?.items)
    }
}

/// Connects through Gardener admin kubeconfigs
pub struct AdminKubeconfigConnector<P> {
    kubeconfigs: P,
}

impl<P: AdminKubeconfigProvider> AdminKubeconfigConnector<P> {
    /// Connector issuing kubeconfigs through `kubeconfigs`
    pub fn new(kubeconfigs: P) -> Self {
        Self { kubeconfigs }
    }
}

#[async_trait]
impl<P: AdminKubeconfigProvider> RuntimeClusterConnector for AdminKubeconfigConnector<P> {
    async fn connect(&self, shoot_name: &str) -> Result<Box<dyn RuntimeClusterReader>> {
        let kubeconfig = self.kubeconfigs.admin_kubeconfig(shoot_name).await?;
        let client = client_from_kubeconfig(&kubeconfig).await?;
        debug!(shoot = %shoot_name, "connected to runtime cluster");
        Ok(Box::new(KubeRuntimeCluster::new(client)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kubeconfig::MockAdminKubeconfigProvider;
    use runtime_common::Error;

    #[test]
    fn openid_connect_resource_is_cluster_api() {
        let resource = KubeRuntimeCluster::openid_connect_resource();
        assert_eq!(resource.api_version, "authentication.gardener.cloud/v1alpha1");
        assert_eq!(resource.plural, "openidconnects");
        assert_eq!(resource.kind, "OpenIDConnect");
    }

    #[tokio::test]
    async fn connect_propagates_kubeconfig_failure() {
        let mut kubeconfigs = MockAdminKubeconfigProvider::new();
        kubeconfigs
            .expect_admin_kubeconfig()
            .withf(|name| name == "c-1")
            .returning(|_| Err(Error::kubeconfig("forbidden")));

        let connector = AdminKubeconfigConnector::new(kubeconfigs);
        let err = connector.connect("c-1").await.err().expect("connect fails");
        assert!(matches!(err, Error::Kubeconfig { .. }));
    }

    #[tokio::test]
    async fn connect_rejects_garbage_kubeconfig() {
        let mut kubeconfigs = MockAdminKubeconfigProvider::new();
        kubeconfigs
            .expect_admin_kubeconfig()
            .returning(|_| Ok("clusters: [".to_string()));

        let connector = AdminKubeconfigConnector::new(kubeconfigs);
        assert!(connector.connect("c-1").await.is_err());
    }
}
