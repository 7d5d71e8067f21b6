//!
//! Signable HTTP messages
//!

use crate::{error::Error, Result};
use http::{request, HeaderMap, Method, Request, Response, StatusCode, Uri};

/// HTTP message that can be signed and verified
///
/// Requests and responses both expose the method and URI of the request.
/// Only responses have a status; requests return [`Error::StatusOnRequest`].
pub trait HttpMessage {
    /// Method of the (originating) request
    fn method(&self) -> &Method;

    /// URI of the (originating) request
    fn uri(&self) -> &Uri;

    /// Headers of the message
    fn headers(&self) -> &HeaderMap;

    /// Mutable headers of the message
    fn headers_mut(&mut self) -> &mut HeaderMap;

    /// Status code of the message
    fn status(&self) -> Result<StatusCode> {
        Err(Error::StatusOnRequest)
    }
}

impl<B> HttpMessage for Request<B> {
    fn method(&self) -> &Method {
        self.method()
    }

    fn uri(&self) -> &Uri {
        self.uri()
    }

    fn headers(&self) -> &HeaderMap {
        self.headers()
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        self.headers_mut()
    }
}

impl HttpMessage for request::Parts {
    fn method(&self) -> &Method {
        &self.method
    }

    fn uri(&self) -> &Uri {
        &self.uri
    }

    fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }
}

/// HTTP response together with the method and URI of the request it answers
#[derive(Debug)]
pub struct ResponseMessage<B> {
    method: Method,
    uri: Uri,
    response: Response<B>,
}

impl<B> ResponseMessage<B> {
    /// Pair a response with the method and URI of its request
    #[must_use]
    pub fn new(method: Method, uri: Uri, response: Response<B>) -> Self {
        Self {
            method,
            uri,
            response,
        }
    }

    /// Pair a response with the request it answers
    #[must_use]
    pub fn for_request<R>(request: &Request<R>, response: Response<B>) -> Self {
        Self::new(request.method().clone(), request.uri().clone(), response)
    }

    /// Reference to the inner response
    #[must_use]
    pub fn response(&self) -> &Response<B> {
        &self.response
    }

    /// Return the inner response
    #[must_use]
    pub fn into_inner(self) -> Response<B> {
        self.response
    }
}

impl<B> HttpMessage for ResponseMessage<B> {
    fn method(&self) -> &Method {
        &self.method
    }

    fn uri(&self) -> &Uri {
        &self.uri
    }

    fn headers(&self) -> &HeaderMap {
        self.response.headers()
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        self.response.headers_mut()
    }

    fn status(&self) -> Result<StatusCode> {
        Ok(self.response.status())
    }
}

#[cfg(test)]
mod test {
    use super::{HttpMessage, ResponseMessage};
    use crate::Error;
    use http::{Request, Response, StatusCode};

    #[test]
    fn requests_have_no_status() {
        let request = Request::get("https://example.com/").body(()).unwrap();
        assert!(matches!(
            HttpMessage::status(&request),
            Err(Error::StatusOnRequest)
        ));

        let (parts, ()) = request.into_parts();
        assert!(matches!(parts.status(), Err(Error::StatusOnRequest)));
    }

    #[test]
    fn responses_carry_request_data() {
        let request = Request::post("https://example.com/foo?bar=baz")
            .body(())
            .unwrap();
        let response = Response::builder()
            .status(StatusCode::CREATED)
            .header("content-type", "application/json")
            .body(())
            .unwrap();

        let message = ResponseMessage::for_request(&request, response);
        assert_eq!(HttpMessage::method(&message), "POST");
        assert_eq!(HttpMessage::uri(&message).path(), "/foo");
        assert_eq!(message.status().unwrap(), StatusCode::CREATED);
        assert!(HttpMessage::headers(&message).contains_key("content-type"));
    }
}
