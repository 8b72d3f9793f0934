use anyhow::{bail, Context};
use clap::Parser;
use model_adapters::utils::{logger, validation::Validate};
use model_adapters::{
    AdapterRegistry, CliConfig, Command, DataSourceConfig, Fields, Query, QueryOptions,
    SchemaModel,
};
use std::sync::Arc;

fn parse_json_object(flag: &str, raw: Option<&str>) -> anyhow::Result<Fields> {
    let Some(raw) = raw else {
        return Ok(Fields::new());
    };
    match serde_json::from_str(raw).with_context(|| format!("--{} is not valid JSON", flag))? {
        serde_json::Value::Object(fields) => Ok(fields),
        _ => bail!("--{} must be a JSON object", flag),
    }
}

fn build_query(model: &str, id: Option<String>, conditions: Fields, options: QueryOptions) -> Query {
    let mut query = Query::new(Arc::new(SchemaModel::open(model)))
        .with_conditions(conditions)
        .with_options(options);
    query.by_id = id;
    query
}

fn print_adapters(registry: &AdapterRegistry) {
    for descriptor in registry.descriptors() {
        println!(
            "{:<12} {:<6} lib={:<8} linked={}",
            descriptor.name,
            descriptor.storage_type.as_str(),
            descriptor.lib.unwrap_or("-"),
            registry.is_linked(descriptor.name)
        );
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();
    let registry = AdapterRegistry::default();

    if let Command::Adapters = cli.command {
        logger::init_cli_logger(cli.verbose);
        print_adapters(&registry);
        return Ok(());
    }

    let config = DataSourceConfig::from_file(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    // 初始化日誌
    if cli.log_json || config.json_logs() {
        logger::init_json_logger(cli.verbose || config.verbose());
    } else {
        logger::init_cli_logger(cli.verbose || config.verbose());
    }

    config.validate().context("invalid data source configuration")?;
    tracing::info!("🔌 Using adapter '{}'", config.adapter_name());

    let adapter = registry.create(config.adapter_name(), Some(config.adapter_options()?))?;

    match cli.command {
        Command::Load {
            model,
            id,
            conditions,
            sort,
            limit,
            skip,
            nocase,
            count,
        } => {
            let sort = match sort {
                Some(raw) => Some(
                    serde_json::from_str(&raw)
                        .unwrap_or(serde_json::Value::String(raw)),
                ),
                None => None,
            };
            let options = QueryOptions {
                sort,
                limit,
                skip,
                nocase,
                count,
                scenario: None,
            };
            let conditions = parse_json_object("where", conditions.as_deref())?;
            let query = build_query(&model, id, conditions, options);

            let result = adapter.load(&query).await?;
            let output = match result.count() {
                Some(n) => serde_json::json!({ "count": n }),
                None if result.is_nothing() => serde_json::Value::Null,
                None => serde_json::to_value(result.into_items())?,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Command::Remove {
            model,
            id,
            conditions,
        } => {
            let conditions = parse_json_object("where", conditions.as_deref())?;
            if id.is_none() && conditions.is_empty() {
                bail!("refusing to remove every {}: pass --id or --where", model);
            }
            let query = build_query(&model, id, conditions, QueryOptions::default());

            let response = adapter.remove(&query).await?;
            tracing::info!("🗑️ Remove request for '{}' completed", model);
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Command::Adapters => print_adapters(&registry),
    }

    Ok(())
}
