use crate::{CSRF_ERROR_HEADER_NAME, RejectionCode};
use http::{HeaderValue, Response, StatusCode};
use pin_project_lite::pin_project;
use std::{
    future::Future,
    pin::Pin,
    task::{self, Poll},
};

pin_project! {
    /// Either the wrapped service's own future or an immediate rejection
    #[project = ResponseFutureProj]
    pub enum ResponseFuture<F> {
        Inner {
            #[pin]
            future: F,
        },
        Reject {
            code: RejectionCode,
        },
    }
}

impl<F, E, ResBody> Future for ResponseFuture<F>
where
    F: Future<Output = Result<Response<ResBody>, E>>,
    ResBody: Default,
{
    type Output = Result<Response<ResBody>, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut task::Context<'_>) -> Poll<Self::Output> {
        match self.project() {
            ResponseFutureProj::Inner { future } => future.poll(cx),
            ResponseFutureProj::Reject { code } => {
                let mut response = Response::new(ResBody::default());
                *response.status_mut() = StatusCode::FORBIDDEN;
                response.headers_mut().insert(
                    CSRF_ERROR_HEADER_NAME.clone(),
                    HeaderValue::from_static(<&'static str>::from(*code)),
                );

                Poll::Ready(Ok(response))
            }
        }
    }
}
