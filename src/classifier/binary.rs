use std::collections::HashSet;
use std::sync::Arc;
use tracing::{trace, warn};

use super::{judge, Classification, Evidence, RejectReason, ScanCache, TestClassifier};
use crate::classfile::{self, ClassDescriptor};
use crate::container::{Module, ModuleContainer};

/// Result of following a superclass chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lineage {
    Descends,
    /// The chain ends outside the lineage root.
    Unrelated,
    /// A link could not be resolved, or the walk hit a cycle or the depth bound.
    Unknown,
}

impl TestClassifier {
    /// Classifies from the compiled descriptor alone, walking the superclass
    /// chain across module boundaries without loading anything.
    pub(super) fn classify_binary(
        &self,
        module: &dyn Module,
        container: &dyn ModuleContainer,
        type_name: &str,
        scan: &mut ScanCache,
    ) -> Classification {
        let path = classfile::entry_path(type_name);
        let bytes = match module.entry(&path) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return Classification::Rejected(RejectReason::MissingEntry),
            Err(e) => {
                warn!(module = %module.id(), type_name, error = %e, "failed to read descriptor");
                return Classification::Rejected(RejectReason::Unreadable(e.to_string()));
            }
        };

        let desc = match classfile::parse(&bytes) {
            Ok(desc) => desc,
            Err(e) => {
                warn!(module = %module.id(), type_name, error = %e, "failed to parse descriptor");
                return Classification::Rejected(RejectReason::Unreadable(e.to_string()));
            }
        };

        let mut chain = HashSet::from([desc.name.clone()]);
        let lineage = self.walk_lineage(module, container, &desc, scan, &mut chain);

        judge(Evidence {
            access: desc.access,
            constructors: &desc.constructors,
            lineage: lineage == Lineage::Descends,
            markers: desc.has_method_annotation(&self.config.test_annotations)
                || desc.has_type_annotation(&self.config.suite_annotations),
            excluded: self.config.is_excluded_base(&desc.name),
        })
    }

    /// Walks `desc`'s superclass chain. Settled outcomes are recorded in
    /// `scan`; an `Unknown` outcome depends on where the walk started and
    /// which module did the lookup, so it is never cached.
    fn walk_lineage(
        &self,
        owner: &dyn Module,
        container: &dyn ModuleContainer,
        desc: &ClassDescriptor,
        scan: &mut ScanCache,
        path: &mut HashSet<String>,
    ) -> Lineage {
        let outcome = self.follow_superclass(owner, container, desc, scan, path);
        match outcome {
            Lineage::Descends => scan.mark_positive(&desc.name),
            Lineage::Unrelated => scan.mark_negative(&desc.name),
            Lineage::Unknown => {}
        }
        outcome
    }

    fn follow_superclass(
        &self,
        owner: &dyn Module,
        container: &dyn ModuleContainer,
        desc: &ClassDescriptor,
        scan: &mut ScanCache,
        path: &mut HashSet<String>,
    ) -> Lineage {
        let Some(super_name) = desc.super_name.as_deref() else {
            return Lineage::Unrelated;
        };

        if scan.is_positive(super_name) {
            return Lineage::Descends;
        }
        if scan.is_negative(super_name) || self.config.is_platform_type(super_name) {
            return Lineage::Unrelated;
        }
        if path.len() > self.config.max_lineage_depth {
            trace!(type_name = %desc.name, super_name, "lineage walk hit the depth bound");
            return Lineage::Unknown;
        }
        if !path.insert(super_name.to_string()) {
            trace!(type_name = %desc.name, super_name, "lineage walk found a superclass cycle");
            return Lineage::Unknown;
        }

        match self.resolve_descriptor(owner, container, super_name) {
            Some((super_desc, provider)) => {
                let next_owner: &dyn Module = match provider.as_deref() {
                    Some(provider) => provider,
                    None => owner,
                };
                self.walk_lineage(next_owner, container, &super_desc, scan, path)
            }
            None => {
                trace!(module = %owner.id(), super_name, "superclass not resolvable from module");
                Lineage::Unknown
            }
        }
    }

    /// Finds the descriptor for `type_name` as seen from `owner`: its own
    /// entries first, then the first wired provider of the type's package.
    fn resolve_descriptor(
        &self,
        owner: &dyn Module,
        container: &dyn ModuleContainer,
        type_name: &str,
    ) -> Option<(ClassDescriptor, Option<Arc<dyn Module>>)> {
        let path = classfile::entry_path(type_name);

        if let Ok(Some(bytes)) = owner.entry(&path) {
            return parse_quietly(type_name, &bytes).map(|d| (d, None));
        }

        for provider_id in owner.dependency_providers(classfile::package_of(type_name)) {
            let Some(provider) = container.module(&provider_id) else {
                trace!(provider = %provider_id, "dependency provider is not installed");
                continue;
            };
            if let Ok(Some(bytes)) = provider.entry(&path) {
                return parse_quietly(type_name, &bytes).map(|d| (d, Some(provider)));
            }
        }

        None
    }
}

fn parse_quietly(type_name: &str, bytes: &[u8]) -> Option<ClassDescriptor> {
    match classfile::parse(bytes) {
        Ok(desc) => Some(desc),
        Err(e) => {
            trace!(type_name, error = %e, "unreadable superclass descriptor");
            None
        }
    }
}
