use crate::metadata::{keys, ClassRef, MetadataStore};
use crate::router::{join_paths, path_parameters, to_openapi_path, RouteDescriptor};
use crate::swagger::metadata::{ApiBody, ApiOperation, ApiParam, ApiResponse};
use crate::swagger::spec::{
    Info, MediaType, OpenApiDocument, Operation, Parameter, ParameterLocation, RequestBody,
    Response, Server, Tag,
};
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashSet};

/// Top-level document information.
#[derive(Debug, Clone, PartialEq)]
pub struct SwaggerInfo {
    pub title: String,
    pub description: Option<String>,
    pub version: String,
    pub servers: Vec<Server>,
}

impl Default for SwaggerInfo {
    fn default() -> Self {
        Self {
            title: "RapidFast API".to_string(),
            description: Some("API Documentation".to_string()),
            version: "1.0.0".to_string(),
            servers: vec![Server {
                url: "/".to_string(),
                description: Some("Development server".to_string()),
            }],
        }
    }
}

/// Builds an OpenAPI document from controller metadata alone.
pub struct SwaggerAssembler<'a> {
    store: &'a MetadataStore,
}

impl<'a> SwaggerAssembler<'a> {
    pub fn new(store: &'a MetadataStore) -> Self {
        Self { store }
    }

    pub fn assemble(&self, controllers: &[ClassRef], info: &SwaggerInfo) -> OpenApiDocument {
        let mut paths: BTreeMap<String, BTreeMap<String, Operation>> = BTreeMap::new();
        let mut tags = Vec::new();
        let mut tag_names = HashSet::new();

        for controller in controllers {
            self.store.ensure_decorated(controller);
            let class = controller.id();

            let controller_tags = self.controller_tags(controller);
            let description = self
                .store
                .get::<String>(keys::SWAGGER_DESCRIPTION, class, None)
                .map(|description| description.as_ref().clone());
            for tag in &controller_tags {
                if tag_names.insert(tag.clone()) {
                    tags.push(Tag {
                        name: tag.clone(),
                        description: Some(
                            description
                                .clone()
                                .unwrap_or_else(|| format!("API endpoints for {tag}")),
                        ),
                    });
                }
            }

            let prefix = self
                .store
                .get::<String>(keys::PREFIX, class, None)
                .map(|prefix| prefix.as_ref().clone())
                .unwrap_or_default();
            let routes = self
                .store
                .get::<Vec<RouteDescriptor>>(keys::ROUTES, class, None)
                .unwrap_or_default();

            for route in routes.iter() {
                let full_path = join_paths(&prefix, &route.path);
                let item = paths.entry(to_openapi_path(&full_path)).or_default();
                let method = route.method.as_lower();
                if item.contains_key(&method) {
                    continue;
                }
                let operation = self.operation(controller, route, &full_path, &controller_tags);
                item.insert(method, operation);
            }
        }

        OpenApiDocument {
            openapi: "3.0.0".to_string(),
            info: Info {
                title: info.title.clone(),
                version: info.version.clone(),
                description: info.description.clone(),
            },
            servers: info.servers.clone(),
            paths,
            tags,
        }
    }

    fn controller_tags(&self, controller: &ClassRef) -> Vec<String> {
        match self.store.get::<Vec<String>>(keys::SWAGGER_TAGS, controller.id(), None) {
            Some(tags) if !tags.is_empty() => tags.as_ref().clone(),
            _ => {
                let name = controller.name();
                let stripped = name.strip_suffix("Controller").filter(|rest| !rest.is_empty());
                vec![stripped.unwrap_or(name).to_string()]
            }
        }
    }

    fn operation(
        &self,
        controller: &ClassRef,
        route: &RouteDescriptor,
        full_path: &str,
        tags: &[String],
    ) -> Operation {
        let class = controller.id();
        let member = Some(route.method_name.as_str());
        let meta = self
            .store
            .get::<ApiOperation>(keys::SWAGGER_OPERATION, class, member)
            .map(|meta| meta.as_ref().clone())
            .unwrap_or_default();

        let mut parameters: Vec<Parameter> = self
            .store
            .get::<Vec<ApiParam>>(keys::SWAGGER_PARAMS, class, member)
            .map(|params| params.iter().map(to_parameter).collect())
            .unwrap_or_default();
        for name in path_parameters(full_path) {
            let declared = parameters
                .iter()
                .any(|param| param.location == ParameterLocation::Path && param.name == name);
            if !declared {
                parameters.push(to_parameter(&ApiParam::new(name)));
            }
        }

        let request_body = self
            .store
            .get::<ApiBody>(keys::SWAGGER_BODY, class, member)
            .map(|body| to_request_body(&body));

        let mut responses: BTreeMap<String, Response> = self
            .store
            .get::<Vec<ApiResponse>>(keys::SWAGGER_RESPONSES, class, member)
            .map(|responses| {
                responses
                    .iter()
                    .map(|response| (response.status.to_string(), to_response(response)))
                    .collect()
            })
            .unwrap_or_default();
        if responses.is_empty() {
            responses.insert(
                "200".to_string(),
                Response {
                    description: "Successful operation".to_string(),
                    content: None,
                },
            );
        }

        Operation {
            summary: Some(meta.summary.unwrap_or_else(|| route.method_name.clone())),
            description: meta.description,
            operation_id: meta.operation_id,
            tags: tags.to_vec(),
            parameters,
            request_body,
            deprecated: meta.deprecated,
            responses,
        }
    }
}

fn to_parameter(param: &ApiParam) -> Parameter {
    Parameter {
        name: param.name.clone(),
        location: param.location,
        description: param.description.clone(),
        required: param.location == ParameterLocation::Path || param.required,
        schema: param.schema.clone().unwrap_or_else(|| json!({ "type": "string" })),
    }
}

fn to_request_body(body: &ApiBody) -> RequestBody {
    let schema = body.schema.clone().unwrap_or_else(|| json!({ "type": "object" }));
    RequestBody {
        description: body.description.clone(),
        required: body.required,
        content: BTreeMap::from([(body.content_type.clone(), MediaType { schema })]),
    }
}

fn to_response(response: &ApiResponse) -> Response {
    let schema: Option<Value> = match (&response.schema, response.is_array) {
        (Some(schema), false) => Some(schema.clone()),
        (Some(schema), true) => Some(json!({ "type": "array", "items": schema })),
        (None, true) => Some(json!({ "type": "array", "items": { "type": "object" } })),
        (None, false) => None,
    };
    Response {
        description: response
            .description
            .clone()
            .unwrap_or_else(|| "Successful response".to_string()),
        content: schema.map(|schema| {
            BTreeMap::from([("application/json".to_string(), MediaType { schema })])
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::Controller;
    use crate::di::{Container, Injectable};
    use crate::error::Result;
    use crate::metadata::ClassId;
    use crate::router::{BoundHandler, HttpMethod};
    use std::sync::Arc;

    struct UserController;

    impl Injectable for UserController {
        fn inject(_container: &Container) -> Result<Self> {
            Ok(UserController)
        }

        fn decorate(store: &MetadataStore) {
            let class = ClassId::of::<Self>();
            store.define(keys::CONTROLLER, true, class, None);
            store.define(keys::PREFIX, "/users".to_string(), class, None);
            store.define(
                keys::ROUTES,
                vec![
                    RouteDescriptor::new(HttpMethod::Get, "/", "find_all"),
                    RouteDescriptor::new(HttpMethod::Get, "/:id", "find_one"),
                    RouteDescriptor::new(HttpMethod::Post, "/", "create"),
                ],
                class,
                None,
            );
            store.define(
                keys::SWAGGER_OPERATION,
                ApiOperation {
                    summary: Some("Create a user".into()),
                    ..Default::default()
                },
                class,
                Some("create"),
            );
            store.define(keys::SWAGGER_BODY, ApiBody::default(), class, Some("create"));
            store.append(keys::SWAGGER_RESPONSES, ApiResponse::new(201), class, Some("create"));
            let mut list = ApiResponse::new(200);
            list.is_array = true;
            store.append(keys::SWAGGER_RESPONSES, list, class, Some("find_all"));
        }
    }

    impl Controller for UserController {
        fn bind_method(self: Arc<Self>, _method_name: &str) -> Option<BoundHandler> {
            None
        }
    }

    struct Health;

    impl Injectable for Health {
        fn inject(_container: &Container) -> Result<Self> {
            Ok(Health)
        }

        fn decorate(store: &MetadataStore) {
            let class = ClassId::of::<Self>();
            store.define(keys::SWAGGER_TAGS, vec!["Ops".to_string()], class, None);
            store.define(keys::SWAGGER_DESCRIPTION, "Liveness".to_string(), class, None);
            store.define(
                keys::ROUTES,
                vec![
                    RouteDescriptor::new(HttpMethod::Get, "/health", "check"),
                    RouteDescriptor::new(HttpMethod::Get, "/health/", "again"),
                ],
                class,
                None,
            );
        }
    }

    impl Controller for Health {
        fn bind_method(self: Arc<Self>, _method_name: &str) -> Option<BoundHandler> {
            None
        }
    }

    fn document() -> OpenApiDocument {
        let store = MetadataStore::new();
        SwaggerAssembler::new(&store).assemble(
            &[
                ClassRef::controller::<UserController>(),
                ClassRef::controller::<Health>(),
            ],
            &SwaggerInfo::default(),
        )
    }

    #[test]
    fn test_paths_and_defaults() {
        let doc = document();
        assert_eq!(doc.openapi, "3.0.0");
        assert_eq!(doc.servers[0].url, "/");

        let users = &doc.paths["/users"];
        assert_eq!(users["get"].summary.as_deref(), Some("find_all"));
        assert_eq!(users["get"].tags, ["User"]);
        assert_eq!(users["post"].summary.as_deref(), Some("Create a user"));
        assert!(users["post"].responses.contains_key("201"));
        let body = users["post"].request_body.as_ref().unwrap();
        assert_eq!(body.content["application/json"].schema, json!({"type": "object"}));

        let list = &users["get"].responses["200"];
        assert_eq!(list.content.as_ref().unwrap()["application/json"].schema["type"], "array");
    }

    #[test]
    fn test_undeclared_path_params_are_documented() {
        let doc = document();
        let find_one = &doc.paths["/users/{id}"]["get"];
        assert_eq!(find_one.parameters.len(), 1);
        assert_eq!(find_one.parameters[0].name, "id");
        assert_eq!(find_one.parameters[0].location, ParameterLocation::Path);
        assert!(find_one.parameters[0].required);
        assert_eq!(find_one.responses["200"].description, "Successful operation");
    }

    #[test]
    fn test_tags_and_first_route_wins() {
        let doc = document();
        let names: Vec<_> = doc.tags.iter().map(|tag| tag.name.as_str()).collect();
        assert_eq!(names, ["User", "Ops"]);
        assert_eq!(doc.tags[0].description.as_deref(), Some("API endpoints for User"));
        assert_eq!(doc.tags[1].description.as_deref(), Some("Liveness"));
        assert_eq!(doc.paths["/health"]["get"].summary.as_deref(), Some("check"));
    }
}
