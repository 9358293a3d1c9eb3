use std::collections::HashSet;

use ocg_core::classify::SchemaKind;
use ocg_core::config::OcgConfig;
use ocg_core::ir::IrSpec;
use ocg_core::{CodeGenerator, GeneratedFile, GeneratorError};

use crate::emitters;
use crate::emitters::class_path;

/// PHP client code generator.
pub struct PhpClientGenerator;

impl CodeGenerator for PhpClientGenerator {
    fn generate(
        &self,
        ir: &IrSpec,
        config: &OcgConfig,
    ) -> Result<Vec<GeneratedFile>, GeneratorError> {
        let namespace = ir.namespace.as_str();
        let mut files = Vec::new();

        for entity in &ir.entities {
            let content = match entity.kind {
                SchemaKind::Object => emitters::models::emit_model(entity, namespace)?,
                SchemaKind::EnumOfStrings
                | SchemaKind::EnumOfIntegers
                | SchemaKind::EnumOfMixedScalars => emitters::enums::emit_enum(entity, namespace)?,
                SchemaKind::Array | SchemaKind::Primitive => {
                    log::debug!("{} has no class of its own", entity.name);
                    continue;
                }
            };
            files.push(GeneratedFile {
                path: class_path("Model", &entity.name),
                content,
            });
        }

        for response in &ir.responses {
            files.push(GeneratedFile {
                path: class_path("Response", &response.name),
                content: emitters::responses::emit_response(response, namespace)?,
            });
        }

        for api in &ir.apis {
            files.push(GeneratedFile {
                path: class_path("Api", &api.class_name),
                content: emitters::apis::emit_api(api, ir)?,
            });
        }

        files.extend([
            GeneratedFile {
                path: "src/Configuration.php".to_string(),
                content: emitters::configuration::emit_configuration(ir)?,
            },
            GeneratedFile {
                path: "src/AbstractApi.php".to_string(),
                content: emitters::configuration::emit_abstract_api(ir)?,
            },
            GeneratedFile {
                path: "src/ApiException.php".to_string(),
                content: emitters::configuration::emit_api_exception(ir)?,
            },
            GeneratedFile {
                path: "composer.json".to_string(),
                content: emitters::composer::emit_composer_json(ir, &config.php)?,
            },
        ]);

        // Reserved-word suffixes can land on a name that is already taken.
        let mut paths = HashSet::with_capacity(files.len());
        for file in &files {
            if !paths.insert(file.path.as_str()) {
                return Err(GeneratorError::Other(format!(
                    "{} would be generated twice",
                    file.path
                )));
            }
        }

        log::debug!("rendered {} files for {}", files.len(), ir.info.title);
        Ok(files)
    }
}
