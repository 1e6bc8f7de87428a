use std::path::{Path, PathBuf};

use harness_util::{HarnessError, HarnessResult};
use serde_json::{json, Value};

fn context_file(working_dir: &Path) -> PathBuf {
    working_dir.join("mockup").join("context.json")
}

async fn mutate(working_dir: &Path, apply: impl FnOnce(&mut Value)) -> HarnessResult<()> {
    let path = context_file(working_dir);
    let text = tokio::fs::read_to_string(&path).await.map_err(|err| {
        HarnessError::internal(anyhow::Error::new(err).context(format!("reading {}", path.display())))
    })?;
    let mut root: Value = serde_json::from_str(&text).map_err(|err| {
        HarnessError::internal(anyhow::Error::new(err).context("parsing context.json"))
    })?;

    apply(&mut root);

    let serialized = serde_json::to_string_pretty(&root).map_err(|err| {
        HarnessError::internal(anyhow::Error::new(err).context("serializing context.json"))
    })?;
    write_atomically(&path, &serialized).await
}

async fn write_atomically(path: &Path, content: &str) -> HarnessResult<()> {
    let tmp_path = path.with_extension("json.tmp");
    tokio::fs::write(&tmp_path, content).await.map_err(|err| {
        HarnessError::internal(anyhow::Error::new(err).context(format!("writing {}", tmp_path.display())))
    })?;
    tokio::fs::rename(&tmp_path, path).await.map_err(|err| {
        HarnessError::internal(anyhow::Error::new(err).context(format!("renaming into {}", path.display())))
    })
}

/// Sets the top-level `chain_id` field.
pub async fn set_chain_id(working_dir: &Path, chain_id: &str) -> HarnessResult<()> {
    mutate(working_dir, |root| {
        root["chain_id"] = json!(chain_id);
    })
    .await
}

/// Sets `context.shell_header.level`.
pub async fn set_shell_header_level(working_dir: &Path, level: u64) -> HarnessResult<()> {
    mutate(working_dir, |root| {
        root["context"]["shell_header"]["level"] = json!(level);
    })
    .await
}

/// Sets `context.shell_header.timestamp`, an RFC3339 string.
pub async fn set_shell_header_timestamp(working_dir: &Path, timestamp: &str) -> HarnessResult<()> {
    mutate(working_dir, |root| {
        root["context"]["shell_header"]["timestamp"] = json!(timestamp);
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seed_context(dir: &Path) {
        let mockup_dir = dir.join("mockup");
        tokio::fs::create_dir_all(&mockup_dir).await.unwrap();
        tokio::fs::write(
            mockup_dir.join("context.json"),
            r#"{"chain_id": "NetXabc", "context": {"shell_header": {"level": 1, "timestamp": "2020-01-01T00:00:00Z"}}}"#,
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn sets_chain_id() {
        let dir = tempfile::tempdir().unwrap();
        seed_context(dir.path()).await;
        set_chain_id(dir.path(), "NetXdef").await.unwrap();

        let text = tokio::fs::read_to_string(context_file(dir.path())).await.unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["chain_id"], "NetXdef");
    }

    #[tokio::test]
    async fn sets_nested_shell_header_level() {
        let dir = tempfile::tempdir().unwrap();
        seed_context(dir.path()).await;
        set_shell_header_level(dir.path(), 42).await.unwrap();

        let text = tokio::fs::read_to_string(context_file(dir.path())).await.unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["context"]["shell_header"]["level"], 42);
        assert_eq!(value["context"]["shell_header"]["timestamp"], "2020-01-01T00:00:00Z");
    }

    #[tokio::test]
    async fn sets_shell_header_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        seed_context(dir.path()).await;
        set_shell_header_timestamp(dir.path(), "2030-06-01T00:00:00Z").await.unwrap();

        let text = tokio::fs::read_to_string(context_file(dir.path())).await.unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["context"]["shell_header"]["timestamp"], "2030-06-01T00:00:00Z");
    }
}
