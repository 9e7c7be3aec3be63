#[cfg(test)]
mod tests {
    use trellis::model::{Capability, CastType, EntityType, SchemaRegistry, StorageType};
    use trellis::projection::ProjectionCompiler;
    use trellis::query::RecordingQuery;
    use trellis::schema::SchemaOracle;

    fn oracle() -> SchemaOracle {
        let post = EntityType::new("Post")
            .with_column("id", StorageType::BigInt)
            .with_column("title", StorageType::Varchar)
            .with_column("status", StorageType::Varchar)
            .with_column("property", StorageType::Json)
            .with_cast("property", CastType::Json)
            .with_capability(
                "tags",
                Capability::ToManyThroughPivot {
                    related: "Tag".to_string(),
                    pivot: "post_tag".to_string(),
                },
            )
            .with_capability(
                "author",
                Capability::ToOneInverse {
                    related: "User".to_string(),
                    foreign_key: "author_id".to_string(),
                },
            );

        let tag = EntityType::new("Tag")
            .with_column("id", StorageType::BigInt)
            .with_column("name", StorageType::Varchar)
            .with_column("color", StorageType::Varchar)
            .with_capability(
                "group",
                Capability::ToOneInverse {
                    related: "TagGroup".to_string(),
                    foreign_key: "group_id".to_string(),
                },
            );

        let group = EntityType::new("TagGroup")
            .with_column("id", StorageType::BigInt)
            .with_column("label", StorageType::Varchar);

        let registry = SchemaRegistry::new()
            .with_entity(post)
            .with_entity(tag)
            .with_entity(group);
        SchemaOracle::new(registry)
    }

    fn columns(plan: &trellis::projection::ProjectionPlan) -> Vec<&str> {
        plan.columns.iter().map(String::as_str).collect()
    }

    #[test]
    fn test_empty_spec_means_no_restriction() {
        let oracle = oracle();
        let post = oracle.entity("Post").unwrap();
        let compiler = ProjectionCompiler::new(&oracle);

        let plan = compiler.compile(None, Some(post));
        assert!(plan.is_unrestricted());

        let plan = compiler.compile(Some(""), Some(post));
        assert!(plan.is_unrestricted());

        let plan = compiler.compile(Some(" , ,"), Some(post));
        assert!(plan.is_unrestricted());
    }

    #[test]
    fn test_columns_include_identity_once_restricted() {
        let oracle = oracle();
        let post = oracle.entity("Post").unwrap();
        let plan = ProjectionCompiler::new(&oracle).compile(Some("title,status"), Some(post));

        assert_eq!(columns(&plan), vec!["id", "status", "title"]);
        assert!(plan.relationships.is_empty());
    }

    #[test]
    fn test_json_cast_head_keeps_base_column_only() {
        let oracle = oracle();
        let post = oracle.entity("Post").unwrap();
        let plan =
            ProjectionCompiler::new(&oracle).compile(Some("property.color.shade"), Some(post));

        assert_eq!(columns(&plan), vec!["id", "property"]);
        assert!(!plan.relationships.contains_key("property"));
    }

    #[test]
    fn test_bare_relationship_mention_projects_in_full() {
        let oracle = oracle();
        let post = oracle.entity("Post").unwrap();
        let plan = ProjectionCompiler::new(&oracle).compile(Some("tags"), Some(post));

        // no explicit column restriction → wildcard at the top level
        assert!(plan.columns.is_empty());
        let tags = plan.relationships.get("tags").unwrap();
        assert!(tags.columns.is_empty());
        assert!(tags.nested.is_empty());
    }

    #[test]
    fn test_repeated_relationship_mentions_union_columns() {
        let oracle = oracle();
        let post = oracle.entity("Post").unwrap();
        let plan =
            ProjectionCompiler::new(&oracle).compile(Some("tags.name,tags.color"), Some(post));

        let tags = plan.relationships.get("tags").unwrap();
        let got: Vec<&str> = tags.columns.iter().map(String::as_str).collect();
        assert_eq!(got, vec!["color", "id", "name"]);
    }

    #[test]
    fn test_multi_level_nesting() {
        let oracle = oracle();
        let post = oracle.entity("Post").unwrap();
        let plan =
            ProjectionCompiler::new(&oracle).compile(Some("tags.group.label"), Some(post));

        let tags = plan.relationships.get("tags").unwrap();
        assert!(tags.columns.is_empty());
        let group = tags.nested.get("group").unwrap();
        let got: Vec<&str> = group.columns.iter().map(String::as_str).collect();
        assert_eq!(got, vec!["id", "label"]);
    }

    #[test]
    fn test_unknown_paths_are_dropped_silently() {
        let oracle = oracle();
        let post = oracle.entity("Post").unwrap();
        let plan = ProjectionCompiler::new(&oracle)
            .compile(Some("title,ghost,ghost.deep,title.under"), Some(post));

        // `ghost*` vanish; `title.under` is a dotted path under a scalar column
        assert_eq!(columns(&plan), vec!["id", "title"]);
        assert!(plan.relationships.is_empty());
    }

    #[test]
    fn test_mixed_specification_with_json_and_relationship_paths() {
        let oracle = oracle();
        let post = oracle.entity("Post").unwrap();
        let plan = ProjectionCompiler::new(&oracle)
            .compile(Some("id,title,property.color,tags.name"), Some(post));

        assert_eq!(columns(&plan), vec!["id", "property", "title"]);
        assert_eq!(plan.relationships.len(), 1);
        let tags = plan.relationships.get("tags").unwrap();
        let got: Vec<&str> = tags.columns.iter().map(String::as_str).collect();
        assert_eq!(got, vec!["id", "name"]);
        assert!(tags.nested.is_empty());
    }

    #[test]
    fn test_no_schema_fallback_keeps_raw_paths() {
        let oracle = oracle();
        let plan = ProjectionCompiler::new(&oracle).compile(Some("title,meta.anything"), None);

        assert_eq!(columns(&plan), vec!["id", "meta.anything", "title"]);
        assert!(plan.relationships.is_empty());
    }

    #[test]
    fn test_apply_requests_identity_at_every_nesting_level() {
        let oracle = oracle();
        let post = oracle.entity("Post").unwrap();
        let compiler = ProjectionCompiler::new(&oracle);
        let plan = compiler.compile(Some("title,tags.name,tags.group.label"), Some(post));

        let mut query = RecordingQuery::new();
        compiler.apply(&plan, Some(post), &mut query);

        assert_eq!(
            query.selected_columns(),
            Some(&["id".to_string(), "title".to_string()][..])
        );
        let tags = query.relationship("tags").unwrap();
        assert_eq!(
            tags.selected_columns(),
            Some(&["id".to_string(), "name".to_string()][..])
        );
        let group = tags.relationship("group").unwrap();
        assert_eq!(
            group.selected_columns(),
            Some(&["id".to_string(), "label".to_string()][..])
        );
    }

    #[test]
    fn test_apply_wildcard_selects_nothing_explicitly() {
        let oracle = oracle();
        let post = oracle.entity("Post").unwrap();
        let compiler = ProjectionCompiler::new(&oracle);
        let plan = compiler.compile(Some("tags"), Some(post));

        let mut query = RecordingQuery::new();
        compiler.apply(&plan, Some(post), &mut query);

        assert!(query.selected_columns().is_none());
        let tags = query.relationship("tags").unwrap();
        assert!(tags.selected_columns().is_none());
    }

    #[test]
    fn test_plan_serializes_as_plain_maps() {
        let oracle = oracle();
        let post = oracle.entity("Post").unwrap();
        let plan = ProjectionCompiler::new(&oracle).compile(Some("id,tags.name"), Some(post));

        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["columns"], serde_json::json!(["id"]));
        assert_eq!(
            json["relationships"]["tags"]["columns"],
            serde_json::json!(["id", "name"])
        );
    }
}
