use actix_web::Result;
use actix_web::dev::ServiceResponse;
use actix_web::middleware::ErrorHandlerResponse;

use crate::middleware::error_handler::jsonify_error;

/// 404 for unknown routes. Handlers' own JSON 404s pass through.
pub fn not_found<B>(res: ServiceResponse<B>) -> Result<ErrorHandlerResponse<B>> {
    jsonify_error(res, Some("Route does not exist"))
}
