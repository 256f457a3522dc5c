//! Corpus Loading Integration Tests

use murmur::CorpusLoader;
use std::path::Path;
use tempfile::TempDir;

async fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.unwrap();
    }
    tokio::fs::write(path, content).await.unwrap();
}

async fn sample_corpus() -> TempDir {
    let temp = TempDir::new().unwrap();
    write(
        temp.path(),
        "english/greetings.yml",
        "categories:\n- greetings\nconversations:\n- - Hello\n  - Hi there!\n  - Hey!\n- - Good morning\n  - Morning!\n",
    )
    .await;
    write(
        temp.path(),
        "english/humor.json",
        r#"{"conversations": [["Tell me a joke", "Why did the robot go on holiday? To recharge."]]}"#,
    )
    .await;
    write(
        temp.path(),
        "french/greetings.yml",
        "conversations:\n- - Bonjour\n  - Salut !\n",
    )
    .await;
    write(temp.path(), "README.md", "not a language").await;
    temp
}

#[tokio::test]
async fn test_load_is_idempotent() {
    let temp = sample_corpus().await;
    let first = CorpusLoader::load(temp.path()).await.unwrap();
    let second = CorpusLoader::load(temp.path()).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_load_structure() {
    let temp = sample_corpus().await;
    let corpus = CorpusLoader::load(temp.path()).await.unwrap();

    assert_eq!(corpus.languages().collect::<Vec<_>>(), vec!["english", "french"]);
    assert_eq!(
        corpus.categories("english").into_iter().collect::<Vec<_>>(),
        vec!["greetings", "humor"]
    );
    let greetings = corpus.table("english", "greetings").unwrap();
    assert_eq!(greetings.len(), 2);
    assert_eq!(greetings[0].stimulus(), "Hello");
    assert_eq!(greetings[1].replies(), &["Morning!".to_string()]);
    assert_eq!(corpus.group_count(), 4);
}
