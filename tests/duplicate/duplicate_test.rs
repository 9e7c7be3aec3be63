#[cfg(test)]
mod tests {
    use serde_json::json;
    use trellis::config::DuplicationSettings;
    use trellis::duplicate::{CopyValue, DuplicateError, DuplicationEngine};
    use trellis::model::{
        Capability, CastType, EntityType, Loaded, Record, SchemaRegistry, StorageType,
    };
    use trellis::query::MemoryStore;
    use trellis::schema::SchemaOracle;

    fn registry() -> SchemaRegistry {
        let post = EntityType::new("Post")
            .with_column("id", StorageType::BigInt)
            .with_column("title", StorageType::Varchar)
            .with_column("slug", StorageType::Varchar)
            .with_column("status", StorageType::Varchar)
            .with_column("category_id", StorageType::BigInt)
            .with_column("created_at", StorageType::Timestamp)
            .with_column("updated_at", StorageType::Timestamp)
            .with_capability(
                "tags",
                Capability::ToManyThroughPivot {
                    related: "Tag".to_string(),
                    pivot: "post_tag".to_string(),
                },
            )
            .with_capability(
                "category",
                Capability::ToOneInverse {
                    related: "Category".to_string(),
                    foreign_key: "category_id".to_string(),
                },
            )
            .with_capability(
                "comments",
                Capability::ToMany {
                    related: "Comment".to_string(),
                },
            )
            .with_capability("owner", Capability::PolymorphicInverse);

        let tag = EntityType::new("Tag")
            .with_column("id", StorageType::BigInt)
            .with_column("name", StorageType::Varchar);

        let category = EntityType::new("Category")
            .with_column("id", StorageType::BigInt)
            .with_column("name", StorageType::Varchar);

        SchemaRegistry::new()
            .with_entity(post)
            .with_entity(tag)
            .with_entity(category)
    }

    fn seeded_store(registry: &SchemaRegistry) -> MemoryStore {
        let mut store = MemoryStore::new(registry.clone());
        store.seed(
            "Category",
            json!({"id": 7, "name": "News"}).as_object().unwrap().clone(),
        );
        store.seed(
            "Post",
            json!({
                "id": 1,
                "title": "Doc",
                "slug": "doc",
                "status": "published",
                "category_id": 7,
                "created_at": "2026-01-01T00:00:00Z",
                "updated_at": "2026-01-02T00:00:00Z"
            })
            .as_object()
            .unwrap()
            .clone(),
        );
        store.attach("Post", 1, "tags", vec![3, 5]);
        store
    }

    #[test]
    fn test_duplicate_copies_pivot_ids_and_suffixes_title() {
        let registry = registry();
        let oracle = SchemaOracle::new(registry.clone());
        let settings = DuplicationSettings::default();
        let engine = DuplicationEngine::new(&oracle, &settings);
        let mut store = seeded_store(&registry);

        let copy = engine
            .duplicate("Post", 1, &["tags".to_string()], &mut store)
            .unwrap();

        let id = copy.identity_value("id").unwrap();
        assert_ne!(id, 1);
        assert_eq!(copy.get("title"), Some(&json!("Doc (Copy)")));
        assert_eq!(copy.get("slug"), Some(&json!("doc-copy")));
        assert_eq!(copy.get("status"), Some(&json!("published")));
        assert_eq!(store.associations("Post", id, "tags"), vec![3, 5]);
        assert!(copy.is_loaded("tags"));
        assert_eq!(
            copy.relationships.get("tags"),
            Some(&Loaded::Ids(vec![3, 5]))
        );
        // bookkeeping columns never copy
        assert!(copy.get("created_at").is_none());
        assert!(copy.get("updated_at").is_none());
    }

    #[test]
    fn test_duplicate_copies_scalar_foreign_key() {
        let registry = registry();
        let oracle = SchemaOracle::new(registry.clone());
        let settings = DuplicationSettings::default();
        let engine = DuplicationEngine::new(&oracle, &settings);
        let mut store = seeded_store(&registry);

        let copy = engine
            .duplicate("Post", 1, &["category".to_string()], &mut store)
            .unwrap();

        assert_eq!(copy.get("category_id"), Some(&json!(7)));
        match copy.relationships.get("category") {
            Some(Loaded::One(Some(category))) => {
                assert_eq!(category.get("name"), Some(&json!("News")));
            }
            other => panic!("expected loaded category, got {:?}", other),
        }
    }

    #[test]
    fn test_counted_suffix_increments_on_each_round() {
        let registry = registry();
        let oracle = SchemaOracle::new(registry.clone());
        let settings = DuplicationSettings::default();
        let engine = DuplicationEngine::new(&oracle, &settings);
        let mut store = seeded_store(&registry);

        let first = engine.duplicate("Post", 1, &[], &mut store).unwrap();
        assert_eq!(first.get("title"), Some(&json!("Doc (Copy)")));

        let first_id = first.identity_value("id").unwrap();
        let second = engine.duplicate("Post", first_id, &[], &mut store).unwrap();
        assert_eq!(second.get("title"), Some(&json!("Doc (Copy 2)")));
    }

    #[test]
    fn test_invalid_relationships_are_excluded_not_fatal() {
        let registry = registry();
        let oracle = SchemaOracle::new(registry.clone());
        let settings = DuplicationSettings::default();
        let engine = DuplicationEngine::new(&oracle, &settings);
        let post = oracle.entity("Post").unwrap();

        let valid = engine.validate_relationships(
            post,
            &[
                "tags".to_string(),
                "owner".to_string(),
                "undeclared".to_string(),
            ],
        );
        assert_eq!(valid, vec!["tags".to_string()]);

        // The request still succeeds with the bad names filtered out.
        let mut store = seeded_store(&registry);
        let copy = engine
            .duplicate(
                "Post",
                1,
                &["tags".to_string(), "owner".to_string()],
                &mut store,
            )
            .unwrap();
        assert!(copy.relationships.contains_key("tags"));
        assert!(!copy.relationships.contains_key("owner"));
    }

    #[test]
    fn test_owned_children_are_not_auto_duplicated() {
        let registry = registry();
        let oracle = SchemaOracle::new(registry.clone());
        let settings = DuplicationSettings::default();
        let engine = DuplicationEngine::new(&oracle, &settings);
        let post = oracle.entity("Post").unwrap();

        let source = Record::new("Post")
            .with_attr("id", json!(1))
            .with_attr("title", json!("Doc"))
            .with_loaded(
                "comments",
                Loaded::Many(vec![Record::new("Comment").with_attr("id", json!(9))]),
            );

        let plan = engine.plan(post, &source);
        assert!(!plan.relationships.contains_key("comments"));
    }

    #[test]
    fn test_plan_excludes_identity_and_null_foreign_keys() {
        let registry = registry();
        let oracle = SchemaOracle::new(registry.clone());
        let settings = DuplicationSettings::default();
        let engine = DuplicationEngine::new(&oracle, &settings);
        let post = oracle.entity("Post").unwrap();

        let source = Record::new("Post")
            .with_attr("id", json!(1))
            .with_attr("title", json!("Doc"))
            .with_attr("category_id", json!(null))
            .with_loaded("category", Loaded::One(None))
            .with_loaded("tags", Loaded::Ids(vec![3, 5]));

        let plan = engine.plan(post, &source);
        assert!(!plan.attributes.contains_key("id"));
        assert!(!plan.relationships.contains_key("category"));
        assert_eq!(
            plan.relationships.get("tags"),
            Some(&CopyValue::IdList(vec![3, 5]))
        );
    }

    #[test]
    fn test_localized_titles_suffix_per_locale() {
        let post = EntityType::new("Post")
            .with_column("id", StorageType::BigInt)
            .with_column("title", StorageType::Json)
            .with_cast("title", CastType::LocalizedText);
        let registry = SchemaRegistry::new().with_entity(post);
        let oracle = SchemaOracle::new(registry.clone());

        let mut settings = DuplicationSettings::default();
        settings
            .copy_text
            .insert("vi".to_string(), "Bản sao".to_string());
        let engine = DuplicationEngine::new(&oracle, &settings);
        let post = oracle.entity("Post").unwrap();

        let source = Record::new("Post")
            .with_attr("id", json!(1))
            .with_attr("title", json!({"en": "Doc", "vi": "Tài liệu"}));

        let plan = engine.plan(post, &source);
        assert_eq!(
            plan.attributes.get("title"),
            Some(&json!({"en": "Doc (Copy)", "vi": "Tài liệu (Bản sao)"}))
        );
    }

    #[test]
    fn test_localized_value_stored_as_json_string_is_decoded() {
        let post = EntityType::new("Post")
            .with_column("id", StorageType::BigInt)
            .with_column("title", StorageType::Json)
            .with_cast("title", CastType::LocalizedText);
        let registry = SchemaRegistry::new().with_entity(post);
        let oracle = SchemaOracle::new(registry.clone());
        let settings = DuplicationSettings::default();
        let engine = DuplicationEngine::new(&oracle, &settings);
        let post = oracle.entity("Post").unwrap();

        let source = Record::new("Post")
            .with_attr("id", json!(1))
            .with_attr("title", json!("{\"en\": \"Doc\"}"));

        let plan = engine.plan(post, &source);
        assert_eq!(plan.attributes.get("title"), Some(&json!({"en": "Doc (Copy)"})));
    }

    #[test]
    fn test_missing_source_is_a_hard_error() {
        let registry = registry();
        let oracle = SchemaOracle::new(registry.clone());
        let settings = DuplicationSettings::default();
        let engine = DuplicationEngine::new(&oracle, &settings);
        let mut store = MemoryStore::new(registry);

        let result = engine.duplicate("Post", 42, &[], &mut store);
        match result {
            Err(DuplicateError::NotFound { entity, id }) => {
                assert_eq!(entity, "Post");
                assert_eq!(id, 42);
            }
            other => panic!("expected NotFound, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_duplication_plan_serializes_as_plain_maps() {
        let registry = registry();
        let oracle = SchemaOracle::new(registry.clone());
        let settings = DuplicationSettings::default();
        let engine = DuplicationEngine::new(&oracle, &settings);
        let post = oracle.entity("Post").unwrap();

        let source = Record::new("Post")
            .with_attr("id", json!(1))
            .with_attr("title", json!("Doc"))
            .with_attr("category_id", json!(7))
            .with_loaded("tags", Loaded::Ids(vec![3, 5]))
            .with_loaded("category", Loaded::One(None));

        let plan = engine.plan(post, &source);
        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["relationships"]["tags"], json!([3, 5]));
        assert_eq!(json["relationships"]["category"], json!(7));
        assert_eq!(json["attributes"]["title"], json!("Doc (Copy)"));
    }
}
