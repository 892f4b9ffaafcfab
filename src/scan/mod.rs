//! # Scan Module
//!
//! Turns one round of marked declarations into an [`EndpointModel`].
//!
//! Each declaration is classified up front into a [`DeclarationKind`] and then
//! folded into the model:
//!
//! - **Controller** (`controller`, `rest_controller`) - package and stub names
//!   come from the declaration's qualified name
//! - **Route** (`get_mapping`) - method name, response type and sub-resource
//! - **Anything else** - noted as an unknown annotation and skipped
//!
//! `post_mapping` is classified as a route but does not touch the model, nor do
//! `response_body`, `request_body` and `request_param`. They are advertised as
//! triggers so the processor runs for sources that only use them.
//!
//! ```
//! use stubgen::scan::{scan, CollectingMessager, Declaration, Marker, MarkerKind};
//!
//! let declarations = vec![
//!     Declaration::new("com.acme.OrderController")
//!         .with_marker(Marker::new(MarkerKind::RestController)),
//!     Declaration::new("com.acme.OrderController.getOrder")
//!         .with_marker(Marker::new(MarkerKind::GetMapping).with_path(["/orders/{id}"]))
//!         .with_declared_type("OrderView()"),
//! ];
//! let mut messager = CollectingMessager::default();
//! let model = scan(&declarations, &mut messager);
//! assert_eq!(model.method_name(), "GetOrder");
//! assert_eq!(model.sub_resource(), "/orders/{id}");
//! ```

mod declaration;
mod messager;

pub use declaration::{Declaration, DeclarationKind, Marker, MarkerKind, Round};
pub use messager::{CollectingMessager, Messager, TracingMessager};

use http::Method;

use crate::model::EndpointModel;

/// Fold every declaration of a round into a fresh model, in order.
pub fn scan(declarations: &[Declaration], messager: &mut dyn Messager) -> EndpointModel {
    declarations
        .iter()
        .fold(EndpointModel::default(), |model, declaration| {
            visit(model, declaration, messager)
        })
}

fn visit(
    model: EndpointModel,
    declaration: &Declaration,
    messager: &mut dyn Messager,
) -> EndpointModel {
    match declaration.classify() {
        DeclarationKind::Controller(marker) => {
            messager.note(&format!(
                "Processing {} annotation on {}",
                marker.kind, declaration.name
            ));
            let root_resource = marker.first_path().map(str::to_string);
            model.with_controller(&declaration.name, root_resource)
        }
        DeclarationKind::Route { verb, marker } if verb == Method::GET => {
            messager.note(&format!(
                "Processing {} annotation on {}",
                marker.kind, declaration.name
            ));
            let sub_resource = marker.first_path().map(str::to_string);
            let declared_type = declaration.declared_type.as_deref().unwrap_or_default();
            model.with_route(declaration.simple_name(), sub_resource, declared_type)
        }
        DeclarationKind::Route { verb, marker } => {
            tracing::debug!(%verb, name = %declaration.name, "route verb has no stub support");
            messager.note(&format!(
                "Unknown annotation {} on {}",
                marker.kind, declaration.name
            ));
            model
        }
        DeclarationKind::Unrecognized => {
            let kinds = declaration
                .markers
                .iter()
                .map(|m| m.kind.attribute_name())
                .collect::<Vec<_>>()
                .join(", ");
            messager.note(&format!("Unknown annotation {kinds} on {}", declaration.name));
            model
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller(name: &str) -> Declaration {
        Declaration::new(name).with_marker(Marker::new(MarkerKind::RestController))
    }

    fn get_route(name: &str, marker: Marker, declared_type: &str) -> Declaration {
        Declaration::new(name)
            .with_marker(marker)
            .with_declared_type(declared_type)
    }

    #[test]
    fn test_scenario_model() {
        let decls = vec![
            controller("com.acme.OrderController"),
            get_route(
                "com.acme.OrderController.getOrder",
                Marker::new(MarkerKind::GetMapping).with_path(["/orders/{id}"]),
                "OrderView()",
            ),
        ];
        let mut messager = CollectingMessager::default();
        let model = scan(&decls, &mut messager);

        assert_eq!(model.package_name(), "com.acme");
        assert_eq!(model.stub_class_name(), "OrderControllerStub");
        assert_eq!(model.method_name(), "GetOrder");
        assert_eq!(model.response_type(), "OrderView");
        assert_eq!(model.sub_resource(), "/orders/{id}");
        assert_eq!(messager.notes.len(), 2);
    }

    #[test]
    fn test_path_wins_over_value() {
        let decls = vec![get_route(
            "a.B.get",
            Marker::new(MarkerKind::GetMapping)
                .with_path(["/a"])
                .with_value(["/b"]),
            "X",
        )];
        let model = scan(&decls, &mut CollectingMessager::default());
        assert_eq!(model.sub_resource(), "/a");
    }

    #[test]
    fn test_value_fallback() {
        let decls = vec![get_route(
            "a.B.get",
            Marker::new(MarkerKind::GetMapping).with_value(["/b"]),
            "X",
        )];
        let model = scan(&decls, &mut CollectingMessager::default());
        assert_eq!(model.sub_resource(), "/b");
    }

    #[test]
    fn test_no_path_leaves_sub_resource_unset() {
        let decls = vec![get_route("a.B.get", Marker::new(MarkerKind::GetMapping), "X")];
        let model = scan(&decls, &mut CollectingMessager::default());
        assert_eq!(model.sub_resource(), "");
        assert_eq!(model.method_name(), "Get");
    }

    #[test]
    fn test_order_independence_across_kinds() {
        let route = get_route(
            "com.acme.OrderController.getOrder",
            Marker::new(MarkerKind::GetMapping).with_value(["/orders"]),
            "OrderView()",
        );
        let ctrl = controller("com.acme.OrderController");
        let forward = scan(&[ctrl.clone(), route.clone()], &mut CollectingMessager::default());
        let backward = scan(&[route, ctrl], &mut CollectingMessager::default());
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_controller_marker_supplies_root_resource() {
        let decls = vec![Declaration::new("com.acme.OrderController")
            .with_marker(Marker::new(MarkerKind::Controller).with_value(["/api"]))];
        let model = scan(&decls, &mut CollectingMessager::default());
        assert_eq!(model.root_resource(), "/api");
        assert_eq!(model.stub_class_name(), "OrderControllerStub");
    }

    #[test]
    fn test_controller_wins_over_route_on_same_declaration() {
        let decl = Declaration::new("com.acme.OrderController")
            .with_marker(Marker::new(MarkerKind::GetMapping).with_path(["/x"]))
            .with_marker(Marker::new(MarkerKind::RestController));
        assert!(matches!(decl.classify(), DeclarationKind::Controller(_)));
    }

    #[test]
    fn test_unhandled_markers_are_noted_without_model_change() {
        let decls = vec![
            Declaration::new("com.acme.OrderController.create")
                .with_marker(Marker::new(MarkerKind::PostMapping).with_path(["/orders"]))
                .with_declared_type("OrderView()"),
            Declaration::new("com.acme.OrderController.create.body")
                .with_marker(Marker::new(MarkerKind::RequestBody)),
        ];
        let mut messager = CollectingMessager::default();
        let model = scan(&decls, &mut messager);
        assert_eq!(model, EndpointModel::default());
        assert_eq!(messager.notes.len(), 2);
        assert!(messager.notes.iter().all(|n| n.starts_with("Unknown annotation")));
        assert!(messager.notes[1].contains("request_body"));
    }

    #[test]
    fn test_round_collects_annotations() {
        let round = Round::new(vec![
            controller("com.acme.OrderController"),
            Declaration::new("com.acme.Unmarked"),
        ]);
        assert_eq!(round.declarations.len(), 1);
        assert!(round.annotations.contains(&MarkerKind::RestController));
        assert!(Round::new(Vec::new()).is_empty());
    }

    #[test]
    fn test_marker_kind_attribute_names_round_trip() {
        for kind in MarkerKind::ALL {
            assert_eq!(MarkerKind::from_attribute(kind.attribute_name()), Some(kind));
        }
        assert_eq!(MarkerKind::from_attribute("put_mapping"), None);
    }
}
