//! Side-affinity extractor
//!
//! A `UnitVisitor` that turns walk events into a `ModuleScan`. One extractor
//! is reused across every unit of a module; per-unit and per-method state is
//! reset at the matching enter callback.
//!
//! Client references found inside a method are buffered until the method
//! exits, so a dist check anywhere in the body gates the whole body.
//!
//! Nested units (`Outer$Inner`) go through `DisplayTestScanner` instead,
//! which only looks for display-test registrations.

use log::trace;

use crate::logic::bytecode::{
    Annotation, AnnotationTarget, MethodHeader, RefKind, SymbolRef, UnitHeader, UnitVisitor,
};

use super::rules::{
    declared_dists, is_display_test_registration, is_dist_query, is_ignore_server_only_field,
    namespace_affinity, Dist, IGNORE_SERVER_ONLY,
};
use super::scan::{DisplayTestSignals, ModuleScan};

// ============================================================================
// STATE
// ============================================================================

/// Reset at unit enter
#[derive(Debug, Default)]
struct UnitState {
    name: String,
    is_client_only_class: bool,
    is_server_only_class: bool,
}

/// Reset at field enter
#[derive(Debug, Default)]
struct FieldGate {
    client_annotated: bool,
}

/// Reset at method enter, resolved at method exit
#[derive(Debug, Default)]
struct MethodGate {
    active: bool,
    client_annotated: bool,
    has_dist_check: bool,
    pending_client_refs: Vec<String>,
}

#[derive(Debug, Default)]
pub struct SideExtractor {
    scan: ModuleScan,
    unit: UnitState,
    field: FieldGate,
    method: MethodGate,
}

impl SideExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Summary so far (units are merged as they finish)
    pub fn scan(&self) -> &ModuleScan {
        &self.scan
    }

    pub fn scan_mut(&mut self) -> &mut ModuleScan {
        &mut self.scan
    }

    pub fn finish(self) -> ModuleScan {
        self.scan
    }

    fn record_client_ref(&mut self, owner: &str, gated: bool) {
        if gated {
            self.scan.gated_client_refs.insert(owner.to_string());
        } else {
            trace!("Ungated client reference {} in {}", owner, self.unit.name);
            self.scan.ungated_client_refs.insert(owner.to_string());
        }
    }

    fn check_special_symbols(&mut self, reference: &SymbolRef<'_>) {
        let Some(member) = reference.member else { return };

        match reference.kind {
            RefKind::MethodCall | RefKind::FieldRead if is_dist_query(reference.owner, member) => {
                self.method.has_dist_check = true;
                self.scan.has_dist_checks = true;
            }
            _ => observe_display_test_ref(&mut self.scan.display_test, reference),
        }
    }
}

fn observe_display_test_ref(signals: &mut DisplayTestSignals, reference: &SymbolRef<'_>) {
    let Some(member) = reference.member else { return };

    match reference.kind {
        RefKind::MethodCall if is_display_test_registration(reference.owner, member) => {
            signals.registered = true;
        }
        RefKind::FieldRead if is_ignore_server_only_field(reference.owner, member) => {
            signals.server_only = true;
        }
        _ => {}
    }
}

fn observe_display_test_literal(signals: &mut DisplayTestSignals, literal: &str) {
    if literal.contains(IGNORE_SERVER_ONLY) {
        signals.server_only = true;
    }
    if literal.contains("true") && signals.registered {
        signals.client_only = true;
    }
}

// ============================================================================
// VISITOR
// ============================================================================

impl UnitVisitor for SideExtractor {
    fn on_unit_enter(&mut self, unit: &UnitHeader<'_>) {
        self.unit = UnitState { name: unit.name.to_string(), ..Default::default() };
        self.field = FieldGate::default();
        self.method = MethodGate::default();
    }

    fn on_unit_exit(&mut self) {
        self.scan.has_client_only_units |= self.unit.is_client_only_class;
        self.scan.has_server_only_units |= self.unit.is_server_only_class;
    }

    fn on_field_enter(&mut self, _name: &str, _access_flags: u16) {
        self.field = FieldGate::default();
    }

    fn on_annotation(&mut self, annotation: &Annotation, target: AnnotationTarget<'_>) {
        for dist in declared_dists(annotation) {
            match (target, dist) {
                (AnnotationTarget::Class, Dist::Client) => {
                    self.unit.is_client_only_class = true;
                    self.scan.client_subscribers.insert(self.unit.name.clone());
                }
                (AnnotationTarget::Class, Dist::DedicatedServer) => {
                    self.unit.is_server_only_class = true;
                    self.scan.server_subscribers.insert(self.unit.name.clone());
                }
                (AnnotationTarget::Method(_), Dist::Client) => self.method.client_annotated = true,
                (AnnotationTarget::Field(_), Dist::Client) => self.field.client_annotated = true,
                _ => {}
            }
        }
    }

    fn on_method_enter(&mut self, _method: &MethodHeader<'_>) {
        self.method = MethodGate { active: true, ..Default::default() };
    }

    fn on_method_exit(&mut self) {
        let method = std::mem::take(&mut self.method);
        let gated = method.client_annotated || method.has_dist_check || self.unit.is_client_only_class;
        for owner in method.pending_client_refs {
            self.record_client_ref(&owner, gated);
        }
    }

    fn on_type_reference(&mut self, reference: SymbolRef<'_>) {
        self.check_special_symbols(&reference);

        match namespace_affinity(reference.owner) {
            Some(Dist::Client) if self.method.active => {
                self.method.pending_client_refs.push(reference.owner.to_string());
            }
            Some(Dist::Client) => {
                let gated = self.unit.is_client_only_class
                    || (reference.kind == RefKind::FieldType && self.field.client_annotated);
                self.record_client_ref(reference.owner, gated);
            }
            Some(Dist::DedicatedServer) => {
                self.scan.server_refs.insert(reference.owner.to_string());
            }
            None => {}
        }
    }

    fn on_literal(&mut self, literal: &str) {
        observe_display_test_literal(&mut self.scan.display_test, literal);
    }
}

// ============================================================================
// NESTED UNITS
// ============================================================================

/// Display-test detection alone, writing into the module's signals.
/// Nothing it sees reaches the side-reference tally.
pub struct DisplayTestScanner<'a> {
    signals: &'a mut DisplayTestSignals,
}

impl<'a> DisplayTestScanner<'a> {
    pub fn new(signals: &'a mut DisplayTestSignals) -> Self {
        Self { signals }
    }
}

impl UnitVisitor for DisplayTestScanner<'_> {
    fn on_type_reference(&mut self, reference: SymbolRef<'_>) {
        observe_display_test_ref(self.signals, &reference);
    }

    fn on_annotation(&mut self, _annotation: &Annotation, _target: AnnotationTarget<'_>) {}

    fn on_method_enter(&mut self, _method: &MethodHeader<'_>) {}

    fn on_method_exit(&mut self) {}

    fn on_literal(&mut self, literal: &str) {
        observe_display_test_literal(self.signals, literal);
    }
}
