// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! DynamoDB lock table

use super::table::{ensure_ready, TableControl, TableStatus, TABLE_POLL_INTERVAL};
use super::{AddMode, StateGuard, StoreAdapter, StoreError};
use async_trait::async_trait;
use aws_sdk_dynamodb::config::Credentials;
use aws_sdk_dynamodb::error::ProvideErrorMetadata;
use aws_sdk_dynamodb::types::{
    AttributeDefinition, AttributeValue, KeySchemaElement, KeyType, ProvisionedThroughput,
    ScalarAttributeType, TableStatus as SdkTableStatus,
};
use aws_sdk_dynamodb::Client as DynamoDbClient;
use std::collections::{BTreeSet, HashMap};
use sz_core::{Interrupt, ProjectRecord, ProjectState, SerializeConfig};

const KEY_ATTR: &str = "project";
const STATE_ATTR: &str = "state";
const WAITING_ATTR: &str = "waiting";

const THROTTLE_CODES: &[&str] = &[
    "ProvisionedThroughputExceededException",
    "ThrottlingException",
    "RequestLimitExceeded",
];

/// Connection settings for [`DynamoStore`]
#[derive(Clone, PartialEq)]
pub struct DynamoStoreConfig {
    pub table: String,
    pub region: String,
    /// Static access key id and secret; the default provider chain when unset
    pub credentials: Option<(String, String)>,
    pub endpoint_url: Option<String>,
    pub read_capacity: i64,
    pub write_capacity: i64,
}

impl DynamoStoreConfig {
    pub fn from_config(config: &SerializeConfig) -> Self {
        Self {
            table: config.table.name.clone(),
            region: config.aws.region().to_string(),
            credentials: config
                .aws
                .static_credentials()
                .map(|(id, secret)| (id.to_string(), secret.to_string())),
            endpoint_url: config.aws.endpoint_url.clone(),
            read_capacity: config.table.read_capacity,
            write_capacity: config.table.write_capacity,
        }
    }
}

impl std::fmt::Debug for DynamoStoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamoStoreConfig")
            .field("table", &self.table)
            .field("region", &self.region)
            .field("static_credentials", &self.credentials.is_some())
            .field("endpoint_url", &self.endpoint_url)
            .field("read_capacity", &self.read_capacity)
            .field("write_capacity", &self.write_capacity)
            .finish()
    }
}

/// Lock table backed by a DynamoDB table keyed on `project`
#[derive(Clone)]
pub struct DynamoStore {
    client: DynamoDbClient,
    config: DynamoStoreConfig,
    interrupt: Interrupt,
}

impl DynamoStore {
    /// Build a client for the configured region and endpoint.
    ///
    /// Does not touch the table; call [`StoreAdapter::ensure_table`] first.
    pub async fn connect(config: DynamoStoreConfig) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(config.region.clone()));
        if let Some((id, secret)) = &config.credentials {
            loader = loader.credentials_provider(Credentials::new(
                id.clone(),
                secret.clone(),
                None,
                None,
                "serialize-config",
            ));
        }
        if let Some(endpoint) = &config.endpoint_url {
            loader = loader.endpoint_url(endpoint.clone());
        }
        let sdk_config = loader.load().await;
        tracing::debug!(table = %config.table, region = %config.region, "dynamodb client ready");
        Self {
            client: DynamoDbClient::new(&sdk_config),
            config,
            interrupt: Interrupt::never(),
        }
    }

    fn key(project: &str) -> AttributeValue {
        AttributeValue::S(project.to_string())
    }
}

/// Map an SDK failure onto the store's error classes
fn classify(err: impl ProvideErrorMetadata + std::fmt::Display) -> StoreError {
    let detail = match (err.code(), err.message()) {
        (Some(code), Some(message)) => format!("{code}: {message}"),
        (Some(code), None) => code.to_string(),
        _ => err.to_string(),
    };
    match err.code() {
        Some("ConditionalCheckFailedException") => StoreError::ConditionFailed,
        Some(code) if THROTTLE_CODES.contains(&code) => StoreError::Throttled(detail),
        _ => StoreError::Backend(detail),
    }
}

/// Condition expression and `:guard` operand for a state guard.
///
/// A missing state attribute reads as idle, so guards that accept idle must
/// also accept an absent attribute.
fn condition(guard: StateGuard) -> (&'static str, ProjectState) {
    match guard {
        StateGuard::Is(ProjectState::Idle) => (
            "attribute_not_exists(#state) OR #state = :guard",
            ProjectState::Idle,
        ),
        StateGuard::Is(expected) => ("#state = :guard", expected),
        StateGuard::IsNot(ProjectState::Idle) => (
            "attribute_exists(#state) AND #state <> :guard",
            ProjectState::Idle,
        ),
        StateGuard::IsNot(forbidden) => (
            "attribute_not_exists(#state) OR #state <> :guard",
            forbidden,
        ),
    }
}

/// Decode one item into a record
fn decode(project: &str, item: &HashMap<String, AttributeValue>) -> Result<ProjectRecord, StoreError> {
    let malformed = |reason: String| StoreError::Malformed {
        project: project.to_string(),
        reason,
    };

    let state = match item.get(STATE_ATTR) {
        None => ProjectState::Idle,
        Some(value) => value
            .as_s()
            .map_err(|_| malformed(format!("{STATE_ATTR} is not a string")))?
            .parse::<ProjectState>()
            .map_err(|e| malformed(e.to_string()))?,
    };

    let waiting = match item.get(WAITING_ATTR) {
        None => BTreeSet::new(),
        Some(value) => value
            .as_ss()
            .map_err(|_| malformed(format!("{WAITING_ATTR} is not a string set")))?
            .iter()
            .cloned()
            .collect(),
    };

    Ok(ProjectRecord {
        project: project.to_string(),
        state,
        waiting,
    })
}

#[async_trait]
impl TableControl for DynamoStore {
    async fn describe(&self) -> Result<TableStatus, StoreError> {
        match self
            .client
            .describe_table()
            .table_name(&self.config.table)
            .send()
            .await
        {
            Ok(output) => Ok(match output.table().and_then(|t| t.table_status()) {
                Some(SdkTableStatus::Active) => TableStatus::Active,
                Some(SdkTableStatus::Creating) => TableStatus::Creating,
                Some(other) => TableStatus::Other(other.as_str().to_string()),
                None => TableStatus::Other("unknown".to_string()),
            }),
            Err(e) if e.code() == Some("ResourceNotFoundException") => Ok(TableStatus::Missing),
            Err(e) => Err(classify(e)),
        }
    }

    async fn create(&self) -> Result<(), StoreError> {
        let build_err = |e: aws_sdk_dynamodb::error::BuildError| StoreError::Backend(e.to_string());
        let key_schema = KeySchemaElement::builder()
            .attribute_name(KEY_ATTR)
            .key_type(KeyType::Hash)
            .build()
            .map_err(build_err)?;
        let key_attr = AttributeDefinition::builder()
            .attribute_name(KEY_ATTR)
            .attribute_type(ScalarAttributeType::S)
            .build()
            .map_err(build_err)?;
        let throughput = ProvisionedThroughput::builder()
            .read_capacity_units(self.config.read_capacity)
            .write_capacity_units(self.config.write_capacity)
            .build()
            .map_err(build_err)?;

        tracing::info!(table = %self.config.table, "creating lock table");
        match self
            .client
            .create_table()
            .table_name(&self.config.table)
            .key_schema(key_schema)
            .attribute_definitions(key_attr)
            .provisioned_throughput(throughput)
            .send()
            .await
        {
            Ok(_) => Ok(()),
            // Another process created it first
            Err(e) if e.code() == Some("ResourceInUseException") => Ok(()),
            Err(e) => Err(classify(e)),
        }
    }
}

#[async_trait]
impl StoreAdapter for DynamoStore {
    fn interruptible(&self, interrupt: &Interrupt) -> Self {
        Self {
            interrupt: interrupt.clone(),
            ..self.clone()
        }
    }

    async fn ensure_table(&self) -> Result<(), StoreError> {
        ensure_ready(self, TABLE_POLL_INTERVAL, &self.interrupt).await
    }

    async fn get(&self, project: &str) -> Result<Option<ProjectRecord>, StoreError> {
        let output = self
            .client
            .get_item()
            .table_name(&self.config.table)
            .key(KEY_ATTR, Self::key(project))
            .consistent_read(true)
            .send()
            .await
            .map_err(classify)?;
        output.item().map(|item| decode(project, item)).transpose()
    }

    async fn create_if_absent(&self, project: &str) -> Result<(), StoreError> {
        let result = self
            .client
            .put_item()
            .table_name(&self.config.table)
            .item(KEY_ATTR, Self::key(project))
            .item(STATE_ATTR, AttributeValue::S(ProjectState::Idle.to_string()))
            .condition_expression("attribute_not_exists(#key)")
            .expression_attribute_names("#key", KEY_ATTR)
            .send()
            .await
            .map_err(classify);
        match result {
            Ok(_) | Err(StoreError::ConditionFailed) => Ok(()),
            Err(e) => Err(e),
        }
    }

    async fn set_state(
        &self,
        project: &str,
        guard: StateGuard,
        state: ProjectState,
    ) -> Result<(), StoreError> {
        let (expression, operand) = condition(guard);
        self.client
            .update_item()
            .table_name(&self.config.table)
            .key(KEY_ATTR, Self::key(project))
            .update_expression("SET #state = :new")
            .condition_expression(expression)
            .expression_attribute_names("#state", STATE_ATTR)
            .expression_attribute_values(":new", AttributeValue::S(state.to_string()))
            .expression_attribute_values(":guard", AttributeValue::S(operand.to_string()))
            .send()
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn add_waiting(
        &self,
        project: &str,
        job: &str,
        mode: AddMode,
    ) -> Result<(), StoreError> {
        let mut request = self
            .client
            .update_item()
            .table_name(&self.config.table)
            .key(KEY_ATTR, Self::key(project))
            .update_expression("ADD #waiting :jobs")
            .expression_attribute_names("#waiting", WAITING_ATTR)
            .expression_attribute_values(":jobs", AttributeValue::Ss(vec![job.to_string()]));
        if mode == AddMode::IfAbsent {
            request = request
                .condition_expression("NOT contains(#waiting, :job)")
                .expression_attribute_values(":job", AttributeValue::S(job.to_string()));
        }
        request.send().await.map_err(classify)?;
        Ok(())
    }

    async fn remove_waiting(&self, project: &str, job: &str) -> Result<(), StoreError> {
        self.client
            .update_item()
            .table_name(&self.config.table)
            .key(KEY_ATTR, Self::key(project))
            .update_expression("DELETE #waiting :jobs")
            .expression_attribute_names("#waiting", WAITING_ATTR)
            .expression_attribute_values(":jobs", AttributeValue::Ss(vec![job.to_string()]))
            .send()
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn clear_waiting(&self, project: &str) -> Result<(), StoreError> {
        self.client
            .update_item()
            .table_name(&self.config.table)
            .key(KEY_ATTR, Self::key(project))
            .update_expression("REMOVE #waiting")
            .expression_attribute_names("#waiting", WAITING_ATTR)
            .send()
            .await
            .map_err(classify)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "dynamo_tests.rs"]
mod tests;
