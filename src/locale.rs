// Strings shown to the user. The service and its users speak Spanish.

pub const SEND_FAILED: &str =
    "Lo siento, hubo un error al procesar tu solicitud. Por favor, inténtalo de nuevo.";

pub const SOURCES_PREFIX: &str = "Fuentes consultadas: ";
pub const SOURCES_DELIMITER: &str = ", ";

pub const UPLOAD_CONNECTION_FAILED: &str = "❌ Error de conexión al subir el archivo";

pub const NO_FILE_SELECTED: &str = "Ningún archivo seleccionado";
pub const UPLOAD_FAILED_STATUS: &str = "Error al subir";

pub fn sources(sources: &[String]) -> String {
    format!("{}{}", SOURCES_PREFIX, sources.join(SOURCES_DELIMITER))
}

pub fn upload_succeeded(file_name: &str) -> String {
    format!("📄 Archivo cargado correctamente: {}", file_name)
}

pub fn upload_rejected(detail: Option<&str>) -> String {
    format!(
        "❌ Error al procesar el archivo: {}",
        detail.unwrap_or("sin detalle")
    )
}

pub fn uploading(file_name: &str) -> String {
    format!("Subiendo: {}...", file_name)
}

pub fn upload_ready(file_name: &str) -> String {
    format!("{} (listo)", file_name)
}
