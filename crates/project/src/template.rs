//! Starter content for newly created files.
//! 新檔案的預設內容範本。

use crate::language::{extension, stem};

/// Produces skeleton content for `filename`, keyed by its extension.
/// 依副檔名產生新檔案的骨架內容。
pub fn create_default_content(filename: &str) -> String {
    let base = stem(filename);
    match extension(filename).as_str() {
        "tsx" => format!(
            "import React from 'react'\n\
             \n\
             interface {base}Props {{\n  // Define your props here\n}}\n\
             \n\
             const {base}: React.FC<{base}Props> = () => {{\n  return (\n    <div>\n      <h1>{base} Component</h1>\n    </div>\n  )\n}}\n\
             \n\
             export default {base}\n"
        ),
        "ts" => format!(
            "// {filename}\n\
             export interface ExampleInterface {{\n  id: number\n  name: string\n}}\n\
             \n\
             export const exampleFunction = (param: string): string => {{\n  return `Hello, ${{param}}!`\n}}\n"
        ),
        "js" => format!(
            "// {filename}\n\
             console.log(\"Hello from {filename}!\")\n\
             \n\
             function exampleFunction(param) {{\n  return `Hello, ${{param}}!`\n}}\n\
             \n\
             export {{ exampleFunction }}\n"
        ),
        "css" => format!(
            "/* {filename} */\n\
             :root {{\n  font-family: system-ui, sans-serif;\n}}\n\
             \n\
             body {{\n  margin: 0;\n}}\n"
        ),
        "html" | "htm" => format!(
            "<!DOCTYPE html>\n\
             <html lang=\"en\">\n  <head>\n    <meta charset=\"UTF-8\" />\n    <title>{base}</title>\n  </head>\n  <body>\n    <div id=\"root\"></div>\n  </body>\n</html>\n"
        ),
        "json" if filename.eq_ignore_ascii_case("package.json") => {
            "{\n  \"name\": \"vibestudio-project\",\n  \"version\": \"0.1.0\",\n  \"private\": true,\n  \"scripts\": {\n    \"dev\": \"vite\",\n    \"build\": \"vite build\"\n  }\n}\n"
                .to_string()
        }
        "json" => "{\n}\n".to_string(),
        "md" | "markdown" => format!("# {base}\n"),
        "rs" => format!("// {filename}\n\nfn main() {{\n    println!(\"Hello from {filename}!\");\n}}\n"),
        "py" => format!("# {filename}\n\n\ndef main():\n    print(\"Hello from {filename}!\")\n\n\nif __name__ == \"__main__\":\n    main()\n"),
        _ => format!("// {filename}\n\n// Start coding here...\n"),
    }
}

/// Body of the `README.md` placed in a freshly scaffolded project.
pub fn readme_content(project_name: &str) -> String {
    format!(
        "# {project_name}\n\
         \n\
         Created with VibeStudio - Where Code Meets Flow\n\
         \n\
         ## Getting Started\n\
         \n\
         Start editing files in the src folder to build your project.\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tsx_component_is_named_after_file() {
        let content = create_default_content("Button.tsx");
        assert!(content.contains("interface ButtonProps"));
        assert!(content.contains("export default Button"));
    }

    #[test]
    fn script_templates_mention_filename() {
        assert!(create_default_content("util.ts").starts_with("// util.ts\n"));
        assert!(create_default_content("index.js").contains("Hello from index.js!"));
    }

    #[test]
    fn unknown_extension_gets_stub() {
        assert_eq!(
            create_default_content("notes.xyz"),
            "// notes.xyz\n\n// Start coding here...\n"
        );
    }

    #[test]
    fn package_manifest_is_valid_json() {
        let manifest = create_default_content("package.json");
        let value: serde_json::Value = serde_json::from_str(&manifest).unwrap();
        assert_eq!(value["private"], serde_json::Value::Bool(true));
    }
}
