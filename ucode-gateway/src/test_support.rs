//! Mock bundles shared by unit tests.

use std::sync::Arc;

use crate::services::api_reference::MockApiReferenceService;
use crate::services::chat::MockChatService;
use crate::services::object_builder::MockObjectBuilderService;
use crate::services::query::MockQueryService;
use crate::services::scenario::MockScenarioService;
use crate::services::sms::MockSmsService;
use crate::services::transcoder::MockTranscoderService;
use crate::services::versioning::MockVersioningService;
use crate::services::{ObjectBuilderService, ServiceBundle};

/// A bundle whose every client is an expectation-free mock.
pub(crate) fn mock_bundle(namespace: &str) -> ServiceBundle {
    ServiceBundle {
        namespace: namespace.into(),
        object_builder: Arc::new(MockObjectBuilderService::new()),
        enterprise_object_builder: None,
        go_object_builder: Arc::new(MockObjectBuilderService::new()),
        versioning: Arc::new(MockVersioningService::new()),
        api_reference: Arc::new(MockApiReferenceService::new()),
        query: Arc::new(MockQueryService::new()),
        scenario: Arc::new(MockScenarioService::new()),
        chat: Arc::new(MockChatService::new()),
        transcoder: Arc::new(MockTranscoderService::new()),
        sms: Arc::new(MockSmsService::new()),
    }
}

/// The default-namespace bundle with a specific object builder.
pub(crate) fn bundle_with_builder(builder: Arc<dyn ObjectBuilderService>) -> ServiceBundle {
    ServiceBundle {
        object_builder: builder,
        ..mock_bundle("u-code")
    }
}
