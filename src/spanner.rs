use anyhow::{Context, Result};
use async_trait::async_trait;
use gcloud_gax::grpc::Code;
use gcloud_googleapis::spanner::admin::database::v1::{
    CreateDatabaseRequest, GetDatabaseDdlRequest, GetDatabaseRequest, UpdateDatabaseDdlRequest,
};
use gcloud_googleapis::spanner::admin::instance::v1::{
    CreateInstanceRequest, GetInstanceRequest, Instance,
};
use gcloud_spanner::admin::AdminClientConfig;
use gcloud_spanner::admin::client::Client as AdminClient;
use gcloud_spanner::client::{Client, ClientConfig};
use gcloud_spanner::mutation::insert_or_update;
use gcloud_spanner::statement::Statement;
use gcloud_spanner::value::CommitTimestamp;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::Config;
use crate::store::{ImageRecord, RecordStore, StoreError};

const TABLE: &str = "patient_images";

/// Spanner-backed record store: one row per patient in `patient_images`.
///
/// The path list is stored as a JSON string array, so the whole record is
/// written back in a single upsert and read back in a single query.
#[derive(Clone)]
pub struct SpannerRecordStore {
    inner: Arc<Client>,
}

impl SpannerRecordStore {
    /// Connect to Spanner using the provided config.
    ///
    /// The gcloud-spanner library automatically detects the
    /// SPANNER_EMULATOR_HOST environment variable and connects to the
    /// emulator when set, or production Spanner otherwise. Also performs
    /// auto-provisioning: instance, database, and table are created if they
    /// don't exist, enabling zero-setup local development.
    pub async fn from_config(config: &Config) -> Result<Self> {
        auto_provision(config).await?;

        let database_path = format!(
            "projects/{}/instances/{}/databases/{}",
            config.spanner_project, config.spanner_instance, config.spanner_database
        );

        if let Some(emulator) = &config.spanner_emulator_host {
            tracing::info!("Connecting to Spanner emulator at: {}", emulator);
        } else {
            tracing::info!("Connecting to production Spanner");
        }

        let client = Client::new(&database_path, ClientConfig::default())
            .await
            .context("Failed to create Spanner client")?;

        tracing::info!("Connected to Spanner database: {}", database_path);

        Ok(Self {
            inner: Arc::new(client),
        })
    }

    async fn find_record(&self, patient_id: &str) -> Result<Option<ImageRecord>> {
        let mut statement = Statement::new(format!(
            "SELECT id, image_paths FROM {} WHERE patient_id = @patient_id",
            TABLE
        ));
        statement.add_param("patient_id", &patient_id.to_string());

        let mut tx = self
            .inner
            .single()
            .await
            .context("Failed to create read transaction")?;

        let mut result_set = tx
            .query(statement)
            .await
            .context("Failed to query image record")?;

        if let Some(row) = result_set.next().await? {
            let id_str: String = row.column_by_name("id")?;
            let id = Uuid::parse_str(&id_str).context("Stored record id is not a valid UUID")?;

            let paths_json: String = row.column_by_name("image_paths")?;
            let image_paths: Vec<String> = serde_json::from_str(&paths_json)
                .context("Failed to deserialize stored image paths")?;

            tracing::debug!(
                "Found record for patient {} ({} paths)",
                patient_id,
                image_paths.len()
            );
            Ok(Some(ImageRecord {
                id,
                patient_id: patient_id.to_string(),
                image_paths,
            }))
        } else {
            tracing::debug!("No record for patient {}", patient_id);
            Ok(None)
        }
    }

    async fn save_record(&self, record: &ImageRecord) -> Result<()> {
        let id_str = record.id.to_string();
        let paths_json = serde_json::to_string(&record.image_paths)
            .context("Failed to serialize image paths")?;

        let mutation = insert_or_update(
            TABLE,
            &["patient_id", "id", "image_paths", "created_at", "updated_at"],
            &[
                &record.patient_id,
                &id_str,
                &paths_json,
                &CommitTimestamp::new(),
                &CommitTimestamp::new(),
            ],
        );

        self.inner
            .apply(vec![mutation])
            .await
            .context("Failed to save image record")?;

        tracing::debug!(
            "Saved record for patient {} ({} paths)",
            record.patient_id,
            record.image_paths.len()
        );
        Ok(())
    }
}

#[async_trait]
impl RecordStore for SpannerRecordStore {
    async fn find(&self, patient_id: &str) -> Result<Option<ImageRecord>, StoreError> {
        self.find_record(patient_id).await.map_err(StoreError::Lookup)
    }

    async fn save(&self, record: &ImageRecord) -> Result<(), StoreError> {
        self.save_record(record).await.map_err(StoreError::Save)
    }

    async fn health_check(&self) -> Result<()> {
        let statement = Statement::new("SELECT 1");

        let mut tx = self
            .inner
            .single()
            .await
            .context("Failed to create health check transaction")?;

        let mut result_set = tx
            .query(statement)
            .await
            .context("Failed to execute health check query")?;

        if result_set.next().await?.is_some() {
            Ok(())
        } else {
            Err(anyhow::anyhow!("Health check query returned no results"))
        }
    }
}

/// Create the Spanner instance, database, and table if they don't exist.
async fn auto_provision(config: &Config) -> Result<()> {
    tracing::info!("Starting auto-provisioning checks...");

    let admin_client = AdminClient::new(AdminClientConfig::default())
        .await
        .context("Failed to create Spanner admin client")?;

    let project_path = format!("projects/{}", config.spanner_project);
    let instance_path = format!("{}/instances/{}", project_path, config.spanner_instance);
    let database_path = format!("{}/databases/{}", instance_path, config.spanner_database);

    ensure_instance_exists(&admin_client, config, &project_path, &instance_path).await?;
    ensure_database_exists(&admin_client, &instance_path, &database_path).await?;
    ensure_table_exists(&admin_client, &database_path).await?;

    tracing::info!("Auto-provisioning complete");
    Ok(())
}

async fn ensure_instance_exists(
    admin_client: &AdminClient,
    config: &Config,
    project_path: &str,
    instance_path: &str,
) -> Result<()> {
    let get_request = GetInstanceRequest {
        name: instance_path.to_string(),
        field_mask: None,
    };

    match admin_client.instance().get_instance(get_request, None).await {
        Ok(_) => {
            tracing::info!("Instance already exists: {}", instance_path);
            Ok(())
        }
        Err(status) if status.code() == Code::NotFound => {
            tracing::info!("Instance not found, creating: {}", instance_path);

            let instance_config = if config.spanner_emulator_host.is_some() {
                format!("{}/instanceConfigs/emulator-config", project_path)
            } else {
                format!("{}/instanceConfigs/regional-us-central1", project_path)
            };

            let create_request = CreateInstanceRequest {
                parent: project_path.to_string(),
                instance_id: config.spanner_instance.clone(),
                instance: Some(Instance {
                    name: instance_path.to_string(),
                    config: instance_config,
                    display_name: format!("{} instance", config.spanner_instance),
                    node_count: 1,
                    ..Default::default()
                }),
            };

            let mut operation = admin_client
                .instance()
                .create_instance(create_request, None)
                .await
                .context("Failed to start instance creation")?;

            operation
                .wait(None)
                .await
                .context("Failed to create instance")?;

            tracing::info!("Instance created: {}", instance_path);
            Ok(())
        }
        Err(e) => Err(anyhow::anyhow!(
            "Failed to check instance existence: {}",
            e.message()
        )),
    }
}

async fn ensure_database_exists(
    admin_client: &AdminClient,
    instance_path: &str,
    database_path: &str,
) -> Result<()> {
    let get_request = GetDatabaseRequest {
        name: database_path.to_string(),
    };

    match admin_client.database().get_database(get_request, None).await {
        Ok(_) => {
            tracing::info!("Database already exists: {}", database_path);
            Ok(())
        }
        Err(status) if status.code() == Code::NotFound => {
            tracing::info!("Database not found, creating: {}", database_path);

            let database_id = database_path
                .split('/')
                .next_back()
                .context("Invalid database path")?;

            let create_request = CreateDatabaseRequest {
                parent: instance_path.to_string(),
                create_statement: format!("CREATE DATABASE `{}`", database_id),
                extra_statements: vec![],
                encryption_config: None,
                database_dialect: 1, // Google Standard SQL
                proto_descriptors: vec![],
            };

            let mut operation = admin_client
                .database()
                .create_database(create_request, None)
                .await
                .context("Failed to start database creation")?;

            operation
                .wait(None)
                .await
                .context("Failed to create database")?;

            tracing::info!("Database created: {}", database_path);
            Ok(())
        }
        Err(e) => Err(anyhow::anyhow!(
            "Failed to check database existence: {}",
            e.message()
        )),
    }
}

async fn ensure_table_exists(admin_client: &AdminClient, database_path: &str) -> Result<()> {
    let get_ddl_request = GetDatabaseDdlRequest {
        database: database_path.to_string(),
    };

    let ddl_response = admin_client
        .database()
        .get_database_ddl(get_ddl_request, None)
        .await
        .context("Failed to get database DDL")?;

    let table_exists = ddl_response.into_inner().statements.iter().any(|stmt| {
        stmt.contains(&format!("CREATE TABLE {}", TABLE))
            || stmt.contains(&format!("CREATE TABLE `{}`", TABLE))
    });

    if table_exists {
        tracing::info!("Table '{}' already exists", TABLE);
        return Ok(());
    }

    tracing::info!("Table '{}' not found, creating...", TABLE);

    let create_table_ddl = format!(
        r#"
CREATE TABLE {TABLE} (
    patient_id STRING(64) NOT NULL,
    id STRING(36) NOT NULL,
    image_paths JSON NOT NULL,
    created_at TIMESTAMP NOT NULL OPTIONS (allow_commit_timestamp=true),
    updated_at TIMESTAMP NOT NULL OPTIONS (allow_commit_timestamp=true),
) PRIMARY KEY (patient_id)
"#
    )
    .trim()
    .to_string();

    let update_request = UpdateDatabaseDdlRequest {
        database: database_path.to_string(),
        statements: vec![create_table_ddl],
        operation_id: String::new(),
        proto_descriptors: vec![],
        throughput_mode: false,
    };

    let mut operation = admin_client
        .database()
        .update_database_ddl(update_request, None)
        .await
        .context("Failed to start table creation")?;

    operation.wait(None).await.context("Failed to create table")?;

    tracing::info!("Table '{}' created", TABLE);
    Ok(())
}
