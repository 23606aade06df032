//! Shoot to Runtime conversion
//!
//! The inverse of shoot synthesis, used once per existing cluster. The
//! produced Runtime is checked by synthesizing a shoot from it in Patch mode
//! and comparing the worker pools with the live shoot.

use std::collections::BTreeMap;

use k8s_openapi::api::rbac::v1::ClusterRoleBinding;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use runtime_common::crd::shoot::{self, Extension};
use runtime_common::crd::{
    ApiServer, ControlPlane, FailureTolerance, Filter, FilterToggle, HighAvailability, Kubernetes,
    Networking, NetworkingSecurity, PoolMachine, PoolMachineImage, PoolVolume, Provider,
    ProviderType, Runtime, RuntimeShoot, RuntimeSpec, Security, Shoot, WorkerPool,
};
use runtime_common::{ConverterConfig, Error, Result};
use runtime_shoot::{Converter, LiveShoot, OperationContext, WorkerDefaults};

/// Label marking runtimes created by this tool
pub const MIGRATOR_LABEL: &str = "operator.kyma-project.io/created-by-migrator";
/// Label carrying the runtime ID
pub const RUNTIME_ID_LABEL: &str = "kyma-project.io/runtime-id";
/// Label carrying the shoot name
pub const SHOOT_NAME_LABEL: &str = "kyma-project.io/shoot-name";

const NETWORKING_FILTER_EXTENSION: &str = "shoot-networking-filter";
const SEED_REGION_LABEL: &str = "seed.gardener.cloud/region";

/// Build the Runtime describing an existing shoot
pub fn runtime_from_shoot(
    shoot: &Shoot,
    runtime_id: &str,
    administrators: Vec<String>,
    namespace: &str,
) -> Result<Runtime> {
    let spec = &shoot.spec;
    let shoot_name = shoot
        .metadata
        .name
        .clone()
        .ok_or_else(|| Error::migration(runtime_id, "shoot has no name"))?;
    let provider_type: ProviderType = spec.provider.type_.parse()?;

    let mut pools = spec.provider.workers.iter().map(worker_pool);
    let primary: Vec<WorkerPool> = pools.next().into_iter().collect();
    if primary.is_empty() {
        return Err(Error::migration(runtime_id, "shoot has no workers"));
    }
    let additional: Vec<WorkerPool> = pools.collect();

    let networking = spec
        .networking
        .as_ref()
        .ok_or_else(|| Error::migration(runtime_id, "shoot has no networking section"))?;
    let nodes = networking
        .nodes
        .clone()
        .ok_or_else(|| Error::migration(runtime_id, "shoot has no node CIDR"))?;

    let enforce_seed_location = spec
        .seed_selector
        .as_ref()
        .and_then(|s| s.match_labels.as_ref())
        .map(|labels| labels.contains_key(SEED_REGION_LABEL))
        .filter(|enforced| *enforced);

    let mut runtime = Runtime::new(
        runtime_id,
        RuntimeSpec {
            shoot: RuntimeShoot {
                name: shoot_name.clone(),
                purpose: spec.purpose.clone(),
                region: spec.region.clone(),
                platform_region: None,
                secret_binding_name: spec.secret_binding_name.clone().unwrap_or_default(),
                enforce_seed_location,
                kubernetes: Kubernetes {
                    version: Some(spec.kubernetes.version.clone()).filter(|v| !v.is_empty()),
                    kube_api_server: ApiServer {
                        oidc_config: spec
                            .kubernetes
                            .kube_api_server
                            .as_ref()
                            .and_then(|s| s.oidc_config.clone()),
                        additional_oidc_config: None,
                    },
                },
                provider: Provider {
                    type_: provider_type,
                    workers: primary,
                    additional_workers: Some(additional).filter(|a| !a.is_empty()),
                },
                networking: Networking {
                    type_: networking.type_.clone(),
                    nodes,
                    pods: networking.pods.clone().unwrap_or_default(),
                    services: networking.services.clone().unwrap_or_default(),
                },
                control_plane: spec.control_plane.as_ref().map(|cp| ControlPlane {
                    high_availability: cp.high_availability.as_ref().map(|ha| HighAvailability {
                        failure_tolerance: FailureTolerance {
                            type_: ha.failure_tolerance.type_.clone(),
                        },
                    }),
                }),
            },
            security: Security {
                administrators,
                networking: NetworkingSecurity {
                    filter: Filter {
                        egress: FilterToggle {
                            enabled: egress_filter_enabled(&spec.extensions),
                        },
                        ingress: None,
                    },
                },
            },
        },
    );
    runtime.metadata = ObjectMeta {
        name: Some(runtime_id.to_string()),
        namespace: Some(namespace.to_string()),
        labels: Some(BTreeMap::from([
            (MIGRATOR_LABEL.to_string(), "true".to_string()),
            (RUNTIME_ID_LABEL.to_string(), runtime_id.to_string()),
            (SHOOT_NAME_LABEL.to_string(), shoot_name),
        ])),
        ..Default::default()
    };
    Ok(runtime)
}

/// Users bound to cluster-admin
///
/// Groups and service accounts are not administrators in the Runtime sense.
pub fn administrators(bindings: &[ClusterRoleBinding]) -> Vec<String> {
    let mut users: Vec<String> = bindings
        .iter()
        .flat_map(|b| b.subjects.iter().flatten())
        .filter(|s| s.kind == "User")
        .map(|s| s.name.clone())
        .collect();
    users.sort();
    users.dedup();
    users
}

/// Differences between the live workers and those synthesized from `runtime`
///
/// An empty result means the Runtime reproduces the shoot's worker pools.
pub fn verify(runtime: &Runtime, live: &Shoot, config: &ConverterConfig) -> Result<Vec<String>> {
    let context = OperationContext::patch(
        WorkerDefaults::from_config(config),
        LiveShoot::from_shoot(live)?,
    );
    let synthesized = Converter::new(config, &context).to_shoot(runtime)?;
    Ok(worker_differences(
        &live.spec.provider.workers,
        &synthesized.spec.provider.workers,
    ))
}

fn worker_differences(live: &[shoot::Worker], synthesized: &[shoot::Worker]) -> Vec<String> {
    let mut diffs = Vec::new();
    if live.len() != synthesized.len() {
        diffs.push(format!(
            "worker count: live {} synthesized {}",
            live.len(),
            synthesized.len()
        ));
    }
    for worker in live {
        let Some(other) = synthesized.iter().find(|w| w.name == worker.name) else {
            diffs.push(format!("worker {}: missing from synthesized shoot", worker.name));
            continue;
        };
        let mut field = |name: &str, a: String, b: String| {
            if a != b {
                diffs.push(format!("worker {}: {name} live {a} synthesized {b}", worker.name));
            }
        };
        field("machine type", worker.machine.type_.clone(), other.machine.type_.clone());
        field("image", image(worker), image(other));
        field("minimum", worker.minimum.to_string(), other.minimum.to_string());
        field("maximum", worker.maximum.to_string(), other.maximum.to_string());
        field("zones", worker.zones.join(","), other.zones.join(","));
    }
    diffs
}

fn image(worker: &shoot::Worker) -> String {
    match &worker.machine.image {
        Some(image) => format!(
            "{}/{}",
            image.name,
            image.version.as_deref().unwrap_or_default()
        ),
        None => String::new(),
    }
}

fn worker_pool(worker: &shoot::Worker) -> WorkerPool {
    WorkerPool {
        name: worker.name.clone(),
        machine: PoolMachine {
            type_: worker.machine.type_.clone(),
            image: worker.machine.image.as_ref().map(|image| PoolMachineImage {
                name: Some(image.name.clone()).filter(|n| !n.is_empty()),
                version: image.version.clone(),
            }),
            architecture: worker.machine.architecture.clone(),
        },
        minimum: worker.minimum,
        maximum: worker.maximum,
        max_surge: worker.max_surge.clone(),
        max_unavailable: worker.max_unavailable.clone(),
        zones: worker.zones.clone(),
        volume: worker.volume.as_ref().map(|v| PoolVolume {
            type_: v.type_.clone(),
            size: v.volume_size.clone(),
        }),
    }
}

fn egress_filter_enabled(extensions: &[Extension]) -> bool {
    extensions
        .iter()
        .find(|e| e.type_ == NETWORKING_FILTER_EXTENSION)
        .is_some_and(|e| e.disabled != Some(true))
}
