use crate::core::package::Package;
use crate::public::error::{DocxError, NotFound};
use crate::public::stylesheet::{StylesheetTransform, TransformError};
use crate::public::value_extern::ValueExt;
use crate::tests::fixture::{
    CONTENT_TYPES, assert_well_formed, document, document_rels, paragraph, png, read_saved_entry,
    row, write_package, write_template,
};
use crate::{DocxTemplate, TemplateConfig};
use base64::Engine;
use base64::engine::general_purpose;
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::path::Path;
use tempfile::TempDir;
use tokio::fs::try_exists;

#[derive(Serialize)]
struct User {
    name: String,
    age: u8,
}

fn to_row<T: Serialize>(value: &T) -> HashMap<String, Value> {
    match serde_json::to_value(value).unwrap() {
        Value::Object(map) => map.into_iter().collect(),
        other => panic!("expected an object, got {}", other),
    }
}

async fn open_template(
    dir: &TempDir,
    body: &str,
    header: &str,
    footer: &str,
) -> Result<DocxTemplate, DocxError> {
    let path = dir.path().join("template.docx");
    write_template(&path, body, header, footer).await?;

    let mut config = TemplateConfig::default();
    config.set_temp_dir(dir.path());
    DocxTemplate::open_with_config(&path, config).await
}

fn report_body() -> String {
    [
        paragraph("${title}"),
        format!(
            "<w:tbl><w:tblPr/>{}{}</w:tbl>",
            row(&["Name", "Age"]),
            row(&["${name}", "${age}"])
        ),
        paragraph("${items}"),
        paragraph("Item: ${item}"),
        paragraph("${/items}"),
        paragraph("${logo}"),
    ]
    .concat()
}

#[tokio::test]
async fn test_base() -> Result<(), DocxError> {
    let dir = tempfile::tempdir()?;
    let mut docx = open_template(
        &dir,
        &report_body(),
        &paragraph("${title}"),
        &paragraph("${company} ${page}"),
    )
    .await?;

    assert_eq!(
        docx.get_variables(),
        vec![
            "title", "name", "age", "items", "item", "/items", "logo", "company", "page"
        ]
    );

    docx.set_value("title", "Q3 Report");

    let users = [
        User {
            name: "Alice & Bob".to_string(),
            age: 30,
        },
        User {
            name: "Carol".to_string(),
            age: 41,
        },
    ];
    let rows: Vec<_> = users.iter().map(to_row).collect();
    docx.clone_row_and_set_values("name", &rows)?;

    assert_eq!(
        docx.clone_block("items", 2, true),
        Some(paragraph("Item: ${item}"))
    );
    docx.set_value_with_limit("item", "first", 1);
    docx.set_value("${item}", "second");

    let logo = dir.path().join("logo.png");
    tokio::fs::write(&logo, png(10, 20)).await?;
    docx.set_image_value("logo", "logo.png", &logo).await?;
    assert_eq!(docx.image_dimensions(), (95250, 190500));

    let values = HashMap::from([
        ("company".to_string(), json!("ACME <Ltd>")),
        ("page".to_string(), json!(1)),
    ]);
    docx.set_values(&values);

    let working_path = docx.working_path().to_path_buf();
    assert!(try_exists(&working_path).await?);

    let output = dir.path().join("report.docx");
    docx.save_as(&output).await?;
    assert!(!try_exists(&working_path).await?);

    let main = read_saved_entry(&output, "word/document.xml").await?.unwrap();
    assert_well_formed(&main);
    assert!(!main.contains("${"));
    assert!(main.contains(&paragraph("Q3 Report")));
    assert!(main.contains(&row(&["Alice &amp; Bob", "30"])));
    assert!(main.contains(&row(&["Carol", "41"])));
    assert!(main.contains(&row(&["Name", "Age"])));
    assert_eq!(main.matches("Item: first").count(), 1);
    assert_eq!(main.matches("Item: second").count(), 1);
    assert!(main.contains(r#"r:embed="rId1000""#));
    assert!(main.contains(r#"<wp:extent cx="95250" cy="190500"/>"#));

    let header = read_saved_entry(&output, "word/header1.xml").await?.unwrap();
    assert!(header.contains(&paragraph("Q3 Report")));
    let footer = read_saved_entry(&output, "word/footer1.xml").await?.unwrap();
    assert!(footer.contains(&paragraph("ACME &lt;Ltd&gt; 1")));

    let rels = read_saved_entry(&output, "word/_rels/document.xml.rels")
        .await?
        .unwrap();
    assert!(rels.contains(r#"<Relationship Id="rId1000" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="media/logo.png"/>"#));
    assert!(rels.contains(r#"Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml""#));

    let package = Package::open(&output).await?;
    assert_eq!(
        package.read_entry("word/media/logo.png").as_deref(),
        Some(png(10, 20).as_slice())
    );
    let types = package.read_entry_string("[Content_Types].xml")?.unwrap();
    assert!(types.contains(r#"<Default Extension="png" ContentType="image/png"/>"#));
    Ok(())
}

#[tokio::test]
async fn test_set_value_limit_per_part() -> Result<(), DocxError> {
    let dir = tempfile::tempdir()?;
    let mut docx = open_template(
        &dir,
        &paragraph("${x} ${x}"),
        &paragraph("${x} ${x}"),
        &paragraph("${x}"),
    )
    .await?;

    docx.set_value_with_limit("${x}", "y", 1);
    assert!(docx.main_part().contains(&paragraph("y ${x}")));
    assert_eq!(docx.header(1), Some(header_xml("y ${x}").as_str()));
    assert!(docx.footer(1).unwrap().contains(&paragraph("y")));
    assert_eq!(docx.header(0), None);
    assert_eq!(docx.header(2), None);
    assert_eq!(docx.headers().len(), 1);
    assert_eq!(docx.footers().len(), 1);

    // Absent macros are ignored / 不存在的宏会被忽略
    let before = docx.main_part().to_string();
    docx.set_value("missing", "z");
    assert_eq!(docx.main_part(), before);
    Ok(())
}

fn header_xml(text: &str) -> String {
    crate::tests::fixture::header(&paragraph(text))
}

fn footer_xml(text: &str) -> String {
    crate::tests::fixture::footer(&paragraph(text))
}

#[tokio::test]
async fn test_headers_and_footers_contiguous() -> Result<(), DocxError> {
    let dir = tempfile::tempdir()?;
    let template = dir.path().join("template.docx");
    // header3 is missing, so header4 is never loaded / 缺少 header3，header4 不会被加载
    write_package(
        &template,
        &[
            ("[Content_Types].xml", CONTENT_TYPES.to_string()),
            ("word/document.xml", document(&paragraph("${title}"))),
            ("word/header1.xml", header_xml("H1 ${title}")),
            ("word/header2.xml", header_xml("H2 ${title}")),
            ("word/header4.xml", header_xml("H4 ${title}")),
            ("word/footer1.xml", footer_xml("F1")),
            ("word/footer2.xml", footer_xml("F2 ${title}")),
        ],
    )
    .await?;

    let mut config = TemplateConfig::default();
    config.set_temp_dir(dir.path());
    let mut docx = DocxTemplate::open_with_config(&template, config).await?;

    assert_eq!(docx.headers().len(), 2);
    assert_eq!(docx.footers().len(), 2);
    assert_eq!(docx.header(2), Some(header_xml("H2 ${title}").as_str()));
    assert_eq!(docx.header(3), None);
    assert_eq!(docx.header(4), None);
    assert_eq!(docx.get_variables(), vec!["title"]);

    docx.set_value("title", "T");
    let output = dir.path().join("result.docx");
    docx.save_as(&output).await?;

    assert_eq!(
        read_saved_entry(&output, "word/header1.xml").await?,
        Some(header_xml("H1 T"))
    );
    assert_eq!(
        read_saved_entry(&output, "word/header2.xml").await?,
        Some(header_xml("H2 T"))
    );
    assert_eq!(
        read_saved_entry(&output, "word/header4.xml").await?,
        Some(header_xml("H4 ${title}"))
    );
    assert_eq!(
        read_saved_entry(&output, "word/footer2.xml").await?,
        Some(footer_xml("F2 T"))
    );
    assert_eq!(
        read_saved_entry(&output, "word/header3.xml").await?,
        None
    );
    Ok(())
}

#[tokio::test]
async fn test_macros_normalized_on_open() -> Result<(), DocxError> {
    let dir = tempfile::tempdir()?;
    let split = "<w:p><w:r><w:t>${na</w:t></w:r><w:r><w:rPr><w:b/></w:rPr><w:t>me}</w:t></w:r></w:p>";
    let mut docx = open_template(&dir, split, &paragraph("Header"), &paragraph("Footer")).await?;

    assert_eq!(docx.get_variables(), vec!["name"]);
    docx.set_value_bytes("name", b"caf\xe9");
    assert!(docx.main_part().contains("<w:t>café</w:t>"));
    Ok(())
}

#[tokio::test]
async fn test_open_errors() -> Result<(), DocxError> {
    let dir = tempfile::tempdir()?;
    let temp = tempfile::tempdir()?;

    let mut config = TemplateConfig::default();
    config.set_temp_dir(temp.path());
    let result = DocxTemplate::open_with_config(dir.path().join("absent.docx"), config).await;
    assert!(matches!(result, Err(DocxError::TemplateCopyFailed { .. })));
    // The working file does not outlive a failed open / 打开失败后不会遗留工作文件
    assert_eq!(std::fs::read_dir(temp.path())?.count(), 0);

    let template = dir.path().join("template.docx");
    write_template(&template, &paragraph("x"), "", "").await?;
    let mut config = TemplateConfig::default();
    config.set_temp_dir(dir.path().join("no/such/dir"));
    let result = DocxTemplate::open_with_config(&template, config).await;
    assert!(matches!(
        result,
        Err(DocxError::TemporaryFileCreationFailed { .. })
    ));

    let no_main = dir.path().join("no_main.docx");
    write_package(
        &no_main,
        &[("[Content_Types].xml", CONTENT_TYPES.to_string())],
    )
    .await?;
    let mut config = TemplateConfig::default();
    config.set_temp_dir(temp.path());
    let result = DocxTemplate::open_with_config(&no_main, config).await;
    assert!(matches!(result, Err(DocxError::MissingPart(ref part)) if part == "word/document.xml"));
    assert_eq!(std::fs::read_dir(temp.path())?.count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_clone_row_errors() -> Result<(), DocxError> {
    let dir = tempfile::tempdir()?;
    let mut docx = open_template(&dir, &paragraph("${name}"), "", "").await?;

    let result = docx.clone_row("nope", 2);
    assert!(matches!(
        result,
        Err(DocxError::StructuralNotFound(NotFound::Placeholder(ref name))) if name == "${nope}"
    ));
    let result = docx.clone_row("name", 2);
    assert!(matches!(
        result,
        Err(DocxError::StructuralNotFound(NotFound::RowStart(_)))
    ));
    assert_eq!(docx.main_part(), document(&paragraph("${name}")));
    Ok(())
}

#[tokio::test]
async fn test_blocks() -> Result<(), DocxError> {
    let dir = tempfile::tempdir()?;
    let body = [
        paragraph("${keep}"),
        paragraph("kept"),
        paragraph("${/keep}"),
        paragraph("${drop}"),
        paragraph("dropped"),
        paragraph("${/drop}"),
        paragraph("${swap}"),
        paragraph("old"),
        paragraph("${/swap}"),
    ]
    .concat();
    let mut docx = open_template(&dir, &body, "", "").await?;

    // Without replace the part is untouched / 不替换时部件保持不变
    assert_eq!(docx.clone_block("keep", 3, false), Some(paragraph("kept")));
    assert_eq!(docx.main_part(), document(&body));
    assert_eq!(docx.clone_block("absent", 3, true), None);

    docx.delete_block("drop");
    docx.replace_block("swap", &paragraph("new"));
    docx.replace_block("absent", &paragraph("ignored"));

    let expected = [
        paragraph("${keep}"),
        paragraph("kept"),
        paragraph("${/keep}"),
        paragraph("new"),
    ]
    .concat();
    assert_eq!(docx.main_part(), document(&expected));
    Ok(())
}

#[tokio::test]
async fn test_missing_image_is_ignored() -> Result<(), DocxError> {
    let dir = tempfile::tempdir()?;
    let mut docx = open_template(&dir, &paragraph("${logo}"), "", "").await?;

    docx.set_image_value("logo", "logo.png", dir.path().join("absent.png"))
        .await?;
    assert_eq!(docx.main_part(), document(&paragraph("${logo}")));

    let path = docx.save().await?;
    // No image added, relationships are written back untouched / 未添加图片，关系保持原样
    let rels = read_saved_entry(&path, "word/_rels/document.xml.rels").await?;
    assert_eq!(rels, Some(document_rels()));
    assert_eq!(read_saved_entry(&path, "word/media/logo.png").await?, None);
    tokio::fs::remove_file(&path).await?;
    Ok(())
}

#[tokio::test]
async fn test_image_base64_in_cloned_row() -> Result<(), DocxError> {
    let dir = tempfile::tempdir()?;
    let body = format!("<w:tbl>{}</w:tbl>", row(&["${photo}"]));
    let mut config = TemplateConfig::default();
    config.set_temp_dir(dir.path()).set_dpi(72.0);
    let template = dir.path().join("template.docx");
    write_template(&template, &body, "", "").await?;
    let mut docx = DocxTemplate::open_with_config(&template, config).await?;

    docx.clone_row("photo", 2)?;
    let data = general_purpose::STANDARD.encode(png(3, 4));
    docx.set_image_value_base64("photo#2", "second.png", &data)?;
    assert_eq!(docx.image_dimensions(), (38100, 50800));
    assert!(docx.main_part().contains("${photo#1}"));
    assert!(docx.main_part().contains(r#"r:embed="rId1002""#));

    let result = docx.set_image_value_base64("photo#1", "first.png", "not base64!");
    assert!(matches!(result, Err(DocxError::Base64(_))));

    let output = dir.path().join("out/nested/photos.docx");
    docx.save_as(&output).await?;
    let rels = read_saved_entry(&output, "word/_rels/document.xml.rels")
        .await?
        .unwrap();
    assert!(rels.contains(r#"Id="rId1002""#));
    assert!(rels.contains(r#"Target="media/second.png""#));
    Ok(())
}

#[tokio::test]
async fn test_save_as_overwrites() -> Result<(), DocxError> {
    let dir = tempfile::tempdir()?;
    let output = dir.path().join("result.docx");
    tokio::fs::write(&output, b"stale content").await?;

    let mut docx = open_template(&dir, &paragraph("${x}"), "", "").await?;
    docx.set_value("x", "fresh");
    docx.save_as(&output).await?;

    let main = read_saved_entry(&output, "word/document.xml").await?;
    assert_eq!(main, Some(document(&paragraph("fresh"))));
    Ok(())
}

#[tokio::test]
async fn test_save_keeps_working_file() -> Result<(), DocxError> {
    let dir = tempfile::tempdir()?;
    let docx = open_template(&dir, &paragraph("${x}"), "", "").await?;
    let working_path = docx.working_path().to_path_buf();

    let saved = docx.save().await?;
    assert_eq!(saved, working_path);
    assert!(Path::new(&saved).exists());
    assert_eq!(
        read_saved_entry(&saved, "word/document.xml").await?,
        Some(document(&paragraph("${x}")))
    );
    Ok(())
}

struct UpperCaseHandler;

impl ValueExt for UpperCaseHandler {
    fn replace(&self, _key: &str, value: &Value) -> String {
        value.as_str().unwrap_or_default().to_uppercase()
    }

    fn replace_in_table(&self, index: usize, key: &str, value: &Value) -> String {
        format!("{}. {}", index, self.replace(key, value))
    }
}

#[tokio::test]
async fn test_custom_value_handler() -> Result<(), DocxError> {
    let dir = tempfile::tempdir()?;
    let body = format!(
        "{}<w:tbl>{}</w:tbl>",
        paragraph("${greeting}"),
        row(&["${name}"])
    );
    let template = dir.path().join("template.docx");
    write_template(&template, &body, "", "").await?;

    let mut config = TemplateConfig::default();
    config
        .set_temp_dir(dir.path())
        .set_value_handler(Box::new(UpperCaseHandler));
    let mut docx = DocxTemplate::open_with_config(&template, config).await?;

    docx.set_values(&HashMap::from([("greeting".to_string(), json!("hello"))]));
    let rows = vec![
        HashMap::from([("name".to_string(), json!("ann"))]),
        HashMap::from([("${name}".to_string(), json!("bo"))]),
    ];
    docx.clone_row_and_set_values("${name}", &rows)?;

    let expected = format!(
        "{}<w:tbl>{}{}</w:tbl>",
        paragraph("HELLO"),
        row(&["1. ANN"]),
        row(&["2. BO"])
    );
    assert_eq!(docx.main_part(), document(&expected));
    Ok(())
}

/// Replaces `{{name}}` with bound parameters / 用绑定的参数替换 `{{name}}`
#[derive(Default)]
struct ParameterStylesheet {
    parameters: HashMap<String, String>,
}

impl StylesheetTransform for ParameterStylesheet {
    fn set_parameter(&mut self, name: &str, value: &str) -> Result<(), TransformError> {
        if name.is_empty() {
            return Err("empty parameter name".into());
        }
        self.parameters.insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn transform(&self, document: &str) -> Result<String, TransformError> {
        let mut result = document.to_string();
        for (name, value) in &self.parameters {
            result = result.replace(&format!("{{{{{}}}}}", name), value);
        }
        Ok(result)
    }
}

#[tokio::test]
async fn test_apply_stylesheet() -> Result<(), DocxError> {
    let dir = tempfile::tempdir()?;
    let mut docx = open_template(&dir, &paragraph("{{title}}"), "", "").await?;

    let mut stylesheet = ParameterStylesheet::default();
    let parameters = HashMap::from([("title".to_string(), "Styled".to_string())]);
    docx.apply_stylesheet(&mut stylesheet, &parameters)?;
    assert_eq!(docx.main_part(), document(&paragraph("Styled")));

    let parameters = HashMap::from([(String::new(), "x".to_string())]);
    let result = docx.apply_stylesheet(&mut stylesheet, &parameters);
    assert!(matches!(result, Err(DocxError::StylesheetTransformFailed(_))));
    assert_eq!(docx.main_part(), document(&paragraph("Styled")));
    Ok(())
}
