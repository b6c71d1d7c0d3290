/// End-to-end tests for the generated GraphQL API
///
/// These tests verify:
/// 1. A schema can be built from a model bound to the in-memory store
/// 2. Queries, mutations and subscriptions reach the store
/// 3. Associations, connections and custom methods resolve as expected

mod end_to_end_tests {
    use async_graphql::dynamic::Schema;
    use async_graphql::Request;
    use futures::StreamExt;
    use ormgraph::model::{
        AcceptOptions, AcceptType, AssociationKind, EntityConfig, MethodAccept, MethodDescriptor,
        MethodOptions, ModelRegistry,
    };
    use ormgraph::schema::cursor::{CursorNamespace, CursorStyle};
    use ormgraph::schema::{RequestContext, SchemaBuilder};
    use ormgraph::store::{MemoryStore, Store};
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn accept(arg: &str, ty: &str, graphql: AcceptOptions) -> MethodAccept {
        MethodAccept {
            arg: arg.to_string(),
            ty: AcceptType::Single(ty.to_string()),
            graphql,
        }
    }

    fn method(name: &str, is_static: bool, accepts: Vec<MethodAccept>, options: MethodOptions) -> MethodDescriptor {
        MethodDescriptor {
            name: name.to_string(),
            is_static,
            accepts,
            returns: vec![],
            graphql: Some(options),
            notes: None,
        }
    }

    fn model() -> Vec<EntityConfig> {
        vec![
            EntityConfig::new("Customer")
                .attribute("name", "STRING")
                .association(AssociationKind::HasMany, "Machine")
                .association(AssociationKind::HasMany, "User"),
            EntityConfig::new("User")
                .attribute("username", "STRING")
                .association(AssociationKind::BelongsTo, "Customer")
                .method(method(
                    "login",
                    true,
                    vec![accept("credentials", "object", AcceptOptions::default())],
                    MethodOptions {
                        singular: Some(true),
                        ..Default::default()
                    },
                ))
                .method(method(
                    "whoami",
                    true,
                    vec![accept(
                        "ctx",
                        "object",
                        AcceptOptions {
                            from_context: true,
                            ..Default::default()
                        },
                    )],
                    MethodOptions::default(),
                ))
                .method(method(
                    "displayName",
                    false,
                    vec![],
                    MethodOptions {
                        as_property: true,
                        return_type: Some("String".to_string()),
                        ..Default::default()
                    },
                )),
            EntityConfig::new("Machine")
                .attribute("serial", "STRING")
                .association(AssociationKind::BelongsTo, "Customer"),
        ]
    }

    /// Schema over a store seeded with two customers, two users and three machines
    async fn seeded_schema() -> Schema {
        seeded_schema_with(CursorStyle::default()).await
    }

    async fn seeded_schema_with(cursor_style: CursorStyle) -> Schema {
        let _ = tracing_subscriber::fmt::try_init();

        let registry = Arc::new(ModelRegistry::from_configs(&model()).expect("valid model"));
        let store = MemoryStore::new(&registry)
            .with_static_method("User", "login", |params| {
                let username = params[0]["username"].clone();
                Ok(json!({ "username": username, "token": "secret" }))
            })
            .with_static_method("User", "whoami", |params| Ok(params[0]["user"].clone()))
            .with_instance_method("User", "displayName", |record, _params| {
                let username = record.get("username").and_then(Value::as_str).unwrap_or_default();
                Ok(Value::String(username.to_uppercase()))
            });

        for row in [json!({"name": "Apple"}), json!({"name": "Initech"})] {
            store.create("Customer", row).await.unwrap();
        }
        for row in [
            json!({"username": "ann", "customerId": 1}),
            json!({"username": "bob", "customerId": 2}),
        ] {
            store.create("User", row).await.unwrap();
        }
        for row in [
            json!({"serial": "AX-2", "customerId": 1}),
            json!({"serial": "AX-1", "customerId": 1}),
            json!({"serial": "IN-1", "customerId": 2}),
        ] {
            store.create("Machine", row).await.unwrap();
        }

        SchemaBuilder::new(registry, Arc::new(store))
            .with_cursor_style(cursor_style)
            .build_schema()
            .expect("Failed to build schema")
    }

    /// Students with lockers, courses joined through enrollments and clubs
    /// that have no join entity
    async fn school_schema() -> Schema {
        let mut student = EntityConfig::new("Student")
            .attribute("name", "STRING")
            .association(AssociationKind::HasOne, "Locker")
            .association(AssociationKind::BelongsToMany, "Course")
            .association(AssociationKind::BelongsToMany, "Club")
            .method(method(
                "rename",
                false,
                vec![accept("name", "string", AcceptOptions::default())],
                MethodOptions::default(),
            ));
        student.associations[1].through = Some("Enrollment".to_string());

        let entities = vec![
            student,
            EntityConfig::new("Locker")
                .attribute("number", "STRING")
                .association(AssociationKind::BelongsTo, "Student"),
            EntityConfig::new("Course").attribute("title", "STRING"),
            EntityConfig::new("Enrollment")
                .attribute("studentId", "INTEGER")
                .attribute("courseId", "INTEGER"),
            EntityConfig::new("Club").attribute("name", "STRING"),
        ];

        let registry = Arc::new(ModelRegistry::from_configs(&entities).expect("valid model"));
        let store = MemoryStore::new(&registry).with_instance_method("Student", "rename", |record, params| {
            Ok(json!({ "from": record.get("name"), "to": params[0] }))
        });

        for row in [json!({"name": "Ada"}), json!({"name": "Ben"})] {
            store.create("Student", row).await.unwrap();
        }
        store
            .create("Locker", json!({"number": "L-7", "studentId": 1}))
            .await
            .unwrap();
        for row in [json!({"title": "Chemistry"}), json!({"title": "Biology"}), json!({"title": "Algebra"})] {
            store.create("Course", row).await.unwrap();
        }
        for row in [
            json!({"studentId": 1, "courseId": 1}),
            json!({"studentId": 2, "courseId": 2}),
            json!({"studentId": 1, "courseId": 3}),
        ] {
            store.create("Enrollment", row).await.unwrap();
        }
        store.create("Club", json!({"name": "Chess"})).await.unwrap();

        SchemaBuilder::new(registry, Arc::new(store))
            .build_schema()
            .expect("Failed to build schema")
    }

    async fn execute(schema: &Schema, request: impl Into<Request>) -> Value {
        let request: Request = request.into();
        let response = schema.execute(request).await;
        assert!(response.errors.is_empty(), "Query had errors: {:?}", response.errors);
        response.data.into_json().expect("Failed to get data")
    }

    #[tokio::test]
    async fn test_query_by_id_with_belongs_to() {
        let schema = seeded_schema().await;

        let data = execute(
            &schema,
            r#"{ User(id: 2) { id username customer { name } } }"#,
        )
        .await;

        assert_eq!(
            data,
            json!({ "User": { "id": 2, "username": "bob", "customer": { "name": "Initech" } } })
        );
    }

    #[tokio::test]
    async fn test_query_by_filter() {
        let schema = seeded_schema().await;

        let data = execute(
            &schema,
            r#"{ User(filter: { where: { username: "ann" } }) { id } }"#,
        )
        .await;
        assert_eq!(data["User"]["id"], json!(1));

        let data = execute(&schema, r#"{ User(id: 42) { id } }"#).await;
        assert_eq!(data["User"], Value::Null);
    }

    #[tokio::test]
    async fn test_connection_fields() {
        let schema = seeded_schema().await;

        let data = execute(
            &schema,
            r#"{
                Machines(filter: { order: "serial" }) {
                    totalCount
                    edges { cursor node { serial } }
                    Machines { serial }
                    pageInfo { hasNextPage hasPreviousPage startCursor endCursor }
                }
            }"#,
        )
        .await;

        let connection = &data["Machines"];
        assert_eq!(connection["totalCount"], json!(3));

        let serials: Vec<&str> = connection["Machines"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["serial"].as_str().unwrap())
            .collect();
        assert_eq!(serials, vec!["AX-1", "AX-2", "IN-1"]);

        let namespace = CursorNamespace::type_name("Machine");
        let edges = connection["edges"].as_array().unwrap();
        assert_eq!(edges.len(), 3);
        assert_eq!(edges[0]["node"]["serial"], json!("AX-1"));
        assert_eq!(
            namespace.decode(edges[0]["cursor"].as_str().unwrap()).unwrap(),
            "2"
        );

        let page_info = &connection["pageInfo"];
        assert_eq!(page_info["hasNextPage"], json!(false));
        assert_eq!(page_info["hasPreviousPage"], json!(false));
        assert_eq!(page_info["startCursor"], json!(namespace.encode("2")));
    }

    #[tokio::test]
    async fn test_global_cursor_style() {
        let schema = seeded_schema_with(CursorStyle::Global).await;

        let data = execute(
            &schema,
            r#"{
                Machines(filter: { order: "serial" }) {
                    edges { cursor }
                    pageInfo { startCursor endCursor }
                }
            }"#,
        )
        .await;

        let connection = &data["Machines"];
        assert_eq!(connection["edges"][0]["cursor"], json!(CursorNamespace::Global.encode("2")));
        assert_eq!(connection["pageInfo"]["startCursor"], json!(CursorNamespace::Global.encode("2")));
        assert_eq!(connection["pageInfo"]["endCursor"], json!(CursorNamespace::Global.encode("2")));
    }

    #[tokio::test]
    async fn test_has_one_resolves_owned_record() {
        let schema = school_schema().await;

        let data = execute(
            &schema,
            r#"{ Students(filter: { order: "name" }) { Students { name locker { number } } } }"#,
        )
        .await;

        assert_eq!(
            data["Students"]["Students"],
            json!([
                { "name": "Ada", "locker": { "number": "L-7" } },
                { "name": "Ben", "locker": null }
            ])
        );
    }

    #[tokio::test]
    async fn test_belongs_to_many_through_join_entity() {
        let schema = school_schema().await;

        let data = execute(
            &schema,
            r#"{
                Student(id: 1) {
                    courses(filter: { order: "title" }) { totalCount Courses { title } }
                }
            }"#,
        )
        .await;
        assert_eq!(
            data["Student"]["courses"],
            json!({
                "totalCount": 2,
                "Courses": [{ "title": "Algebra" }, { "title": "Chemistry" }]
            })
        );

        let data = execute(&schema, r#"{ Student(id: 2) { courses { Courses { title } } } }"#).await;
        assert_eq!(data["Student"]["courses"]["Courses"], json!([{ "title": "Biology" }]));
    }

    #[tokio::test]
    async fn test_belongs_to_many_without_join_entity_is_empty() {
        let schema = school_schema().await;

        let data = execute(
            &schema,
            r#"{ Student(id: 1) { clubs { totalCount Clubs { name } edges { cursor } } } }"#,
        )
        .await;

        assert_eq!(
            data["Student"]["clubs"],
            json!({ "totalCount": 0, "Clubs": [], "edges": [] })
        );
    }

    #[tokio::test]
    async fn test_instance_method_mutation_loads_record_by_id() {
        let schema = school_schema().await;

        let data = execute(&schema, r#"mutation { StudentRename(id: 2, name: "Bea") }"#).await;
        assert_eq!(data["StudentRename"], json!({ "from": "Ben", "to": "Bea" }));

        let data = execute(&schema, r#"mutation { StudentRename(id: 99, name: "Zed") }"#).await;
        assert_eq!(data["StudentRename"], Value::Null);
    }

    #[tokio::test]
    async fn test_has_many_is_restricted_to_owner() {
        let schema = seeded_schema().await;

        let data = execute(
            &schema,
            r#"{
                Customer(id: 1) {
                    name
                    machines { totalCount Machines { serial } }
                    users { totalCount }
                }
            }"#,
        )
        .await;

        let customer = &data["Customer"];
        assert_eq!(customer["machines"]["totalCount"], json!(2));
        assert_eq!(customer["users"]["totalCount"], json!(1));

        // A caller-supplied ownership clause does not escape the parent
        let data = execute(
            &schema,
            r#"{ Customer(id: 1) { machines(filter: { where: { customerId: 2 } }) { totalCount } } }"#,
        )
        .await;
        assert_eq!(data["Customer"]["machines"]["totalCount"], json!(2));
    }

    #[tokio::test]
    async fn test_create_update_delete() {
        let schema = seeded_schema().await;

        let data = execute(
            &schema,
            r#"mutation { UserCreate(data: { username: "cy", customerId: 1 }) { id username } }"#,
        )
        .await;
        assert_eq!(data["UserCreate"], json!({ "id": 3, "username": "cy" }));

        let data = execute(
            &schema,
            r#"mutation { UserUpdate(id: 3, data: { username: "cyd" }) { id username } }"#,
        )
        .await;
        assert_eq!(data["UserUpdate"], json!({ "id": 3, "username": "cyd" }));

        let data = execute(&schema, r#"mutation { UserDelete(id: 3) { username } }"#).await;
        assert_eq!(data["UserDelete"]["username"], json!("cyd"));

        let data = execute(&schema, r#"{ User(id: 3) { id } }"#).await;
        assert_eq!(data["User"], Value::Null);
    }

    #[tokio::test]
    async fn test_update_missing_record_reports_not_found() {
        let schema = seeded_schema().await;

        let response = schema
            .execute(Request::new(
                r#"mutation { UserUpdate(id: "99", data: { username: "x" }) { id } }"#,
            ))
            .await;

        assert_eq!(response.errors.len(), 1);
        assert_eq!(response.errors[0].message, "User with id 99 not found");
    }

    #[tokio::test]
    async fn test_static_method_mutation() {
        let schema = seeded_schema().await;

        let data = execute(
            &schema,
            r#"mutation { UserLogin(credentials: { username: "ann", password: "pw" }) }"#,
        )
        .await;

        assert_eq!(data["UserLogin"], json!({ "username": "ann", "token": "secret" }));
    }

    #[tokio::test]
    async fn test_static_method_reads_request_context() {
        let schema = seeded_schema().await;

        let context = RequestContext::new(json!({ "user": "ann" }));
        let request = Request::new("mutation { UsersWhoami }").data(Arc::new(context));
        let data = execute(&schema, request).await;
        assert_eq!(data["UsersWhoami"], json!("ann"));

        // Without request data the context is empty
        let data = execute(&schema, "mutation { UsersWhoami }").await;
        assert_eq!(data["UsersWhoami"], Value::Null);
    }

    #[tokio::test]
    async fn test_property_method_on_parent_record() {
        let schema = seeded_schema().await;

        let data = execute(
            &schema,
            r#"{ Users(filter: { order: "username" }) { Users { displayName } } }"#,
        )
        .await;

        assert_eq!(
            data["Users"]["Users"],
            json!([{ "displayName": "ANN" }, { "displayName": "BOB" }])
        );
    }

    #[tokio::test]
    async fn test_unimplemented_method_surfaces_store_error() {
        let registry = Arc::new(
            ModelRegistry::from_configs(&[EntityConfig::new("User").method(method(
                "reset",
                true,
                vec![],
                MethodOptions::default(),
            ))])
            .unwrap(),
        );
        let store = Arc::new(MemoryStore::new(&registry));
        let schema = SchemaBuilder::new(registry, store).build_schema().unwrap();

        let response = schema.execute(Request::new("mutation { UsersReset }")).await;
        assert_eq!(response.errors.len(), 1);
        assert_eq!(response.errors[0].message, "Method 'reset' is not defined on User");
    }

    #[tokio::test]
    async fn test_subscription_yields_current_value() {
        let schema = seeded_schema().await;

        let mut stream = schema.execute_stream(Request::new("subscription { User(id: 1) { username } }"));
        let response = stream.next().await.expect("subscription produced no value");
        assert!(response.errors.is_empty(), "Subscription had errors: {:?}", response.errors);

        let data = response.data.into_json().unwrap();
        assert_eq!(data, json!({ "User": { "username": "ann" } }));
        assert!(stream.next().await.is_none());
    }
}
