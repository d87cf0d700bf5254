// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Mnemos memory layer.
//!
//! This crate provides the capability traits, error type, and common
//! types shared by the retrieval and normalization core. Stores, embedding
//! models and completion models are injected through the traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::MnemosError;
pub use types::{AdapterType, HealthStatus};

// Re-export all capability traits at crate root.
pub use traits::{
    CompletionAdapter, EmbeddingAdapter, PluginAdapter, QueryExpander, RelationalStore,
    RerankAdapter, VectorStore,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CompletionRequest, QueryParam, VectorHit};

    #[test]
    fn mnemos_error_display() {
        let err = MnemosError::completion("model overloaded");
        assert_eq!(err.to_string(), "completion error: model overloaded");

        let err = MnemosError::storage(std::io::Error::other("disk full"));
        assert_eq!(err.to_string(), "storage error: disk full");

        let err = MnemosError::embedding("empty output");
        assert_eq!(err.to_string(), "embedding error: empty output");
    }

    #[test]
    fn adapter_type_round_trips_through_strings() {
        use std::str::FromStr;

        let variants = [
            AdapterType::Completion,
            AdapterType::Embedding,
            AdapterType::Rerank,
            AdapterType::RelationalStore,
            AdapterType::VectorStore,
            AdapterType::QueryExpansion,
        ];

        for variant in &variants {
            let s = variant.to_string();
            let parsed = AdapterType::from_str(&s).expect("should parse back");
            assert_eq!(*variant, parsed);
        }
    }

    #[test]
    fn vector_hit_reads_underscore_distance() {
        let json = r#"{"id":"m1","content":"likes tea","group_id":"scope-a","_distance":0.25}"#;
        let hit: VectorHit = serde_json::from_str(json).expect("should deserialize");
        assert_eq!(hit.id, "m1");
        assert_eq!(hit.group_id.as_deref(), Some("scope-a"));
        assert!(hit.user_id.is_none());
        assert!((hit.distance - 0.25).abs() < f32::EPSILON);
        assert!(hit.metadata.is_null());
    }

    #[test]
    fn query_param_conversions() {
        assert_eq!(QueryParam::from("u1"), QueryParam::Text("u1".into()));
        assert_eq!(QueryParam::from(20_i64), QueryParam::Integer(20));
    }

    #[test]
    fn completion_request_builder() {
        let req = CompletionRequest::new("hi").json().with_temperature(0.0);
        assert_eq!(req.prompt, "hi");
        assert!(req.json_mode);
        assert_eq!(req.temperature, Some(0.0));
        assert!(req.system_prompt.is_none());
    }

    #[test]
    fn all_capability_traits_are_exported() {
        fn _assert_plugin_adapter<T: PluginAdapter>() {}
        fn _assert_completion<T: CompletionAdapter>() {}
        fn _assert_rerank<T: RerankAdapter>() {}
        fn _assert_embedding<T: EmbeddingAdapter>() {}
        fn _assert_relational<T: RelationalStore>() {}
        fn _assert_vector<T: VectorStore>() {}
        fn _assert_expander<T: QueryExpander>() {}
    }
}
