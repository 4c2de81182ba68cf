use super::model::{CreateUserRequest, User};
use super::service::UserService;
use rapidfast::prelude::*;

#[controller(path = "/users", tags = ["Users"])]
pub struct UserController {
    service: Arc<UserService>,
}

#[routes]
impl UserController {
    #[post("/")]
    #[api_operation(summary = "Create a user")]
    #[api_body(description = "Name and email of the new user", schema = "CreateUserRequest")]
    #[api_response(status = 201, description = "The created user", schema = "User")]
    #[api_response(status = 400, description = "Name or email failed validation")]
    pub async fn create(
        &self,
        #[body(pipe = ValidationPipe::<CreateUserRequest>::new())] req: CreateUserRequest,
        response: HttpResponse,
    ) -> std::result::Result<Json<User>, HttpException> {
        let user = self.service.create(req).await.map_err(internal)?;
        response.status(StatusCode::CREATED);
        Ok(Json(user))
    }

    #[get("/")]
    #[api_operation(summary = "List users")]
    #[api_response(status = 200, description = "All users", schema = "User", is_array)]
    pub async fn list(&self) -> Result<Json<Vec<User>>> {
        Ok(Json(self.service.list().await?))
    }

    #[get("/:id")]
    #[api_operation(summary = "Find a user by id")]
    #[api_response(status = 200, schema = "User")]
    #[api_response(status = 404, description = "No such user")]
    pub async fn find_one(
        &self,
        #[param("id")] id: String,
    ) -> std::result::Result<Json<User>, HttpException> {
        match self.service.get(&id).await.map_err(internal)? {
            Some(user) => Ok(Json(user)),
            None => Err(HttpException::not_found(format!("User {id} not found"))),
        }
    }

    #[patch("/:id")]
    #[api_operation(summary = "Update a user")]
    pub async fn update(
        &self,
        #[param("id")] id: String,
        #[body] patch: Value,
    ) -> std::result::Result<Json<User>, HttpException> {
        match self.service.update(&id, patch).await.map_err(internal)? {
            Some(user) => Ok(Json(user)),
            None => Err(HttpException::not_found(format!("User {id} not found"))),
        }
    }

    #[delete("/:id")]
    #[api_operation(summary = "Delete a user")]
    #[api_response(status = 204, description = "Deleted")]
    pub async fn remove(&self, #[param("id")] id: String) -> std::result::Result<(), HttpException> {
        if self.service.remove(&id).await.map_err(internal)? {
            Ok(())
        } else {
            Err(HttpException::not_found(format!("User {id} not found")))
        }
    }
}

fn internal(err: RapidError) -> HttpException {
    tracing::error!(error = %err, "User operation failed");
    HttpException::internal_server_error(err.to_string())
}
