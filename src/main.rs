use std::collections::HashMap;
use std::io::{self, Write};

use anyhow::Result;
use guide_state::{GuideKind, JobType, StepId};
use guide_workflow::{ClusterLaunchSpec, ClusterTemplateSpec, DataSourceSpec, GuideError, GuideFactory, GuideService,
                     GuideSnapshot, ImageSpec, JobLaunchSpec, JobTemplateSpec, NodeGroupTemplateSpec, StepOptions,
                     StepPayload};
use log::info;
use provisioning_api::{EntityKind, EntityStatus};

/// Menú interactivo para recorrer las guías de aprovisionamiento.
///
/// El almacén de sesiones y el servicio de aprovisionamiento se configuran con
/// las variables de entorno (ver `GuideFactory::from_env`). La clave de sesión
/// sale de `GUIDE_SESSION_KEY` (por defecto `cli`).
///
/// Opciones soportadas:
/// 1) Guía de creación de cluster
/// 2) Guía de ejecución de trabajo
/// 3) Salir
fn main() -> Result<()> {
    env_logger::init();
    dotenvy::dotenv().ok();
    let service = GuideFactory::from_env()?;
    let session_key = std::env::var("GUIDE_SESSION_KEY").unwrap_or_else(|_| "cli".into());
    info!("guide-cli iniciado con la sesión '{}'", session_key);

    loop {
        println!("\n== Guías de aprovisionamiento ==");
        println!("1) Guía de creación de cluster");
        println!("2) Guía de ejecución de trabajo");
        println!("3) Salir");
        match prompt("Elige una opción: ")?.trim() {
            "1" => guide_menu(&service, &session_key, GuideKind::Cluster)?,
            "2" => guide_menu(&service, &session_key, GuideKind::JobExecution)?,
            "3" => {
                println!("Saliendo...");
                break;
            }
            other => println!("Opción inválida: {}", other),
        }
    }
    Ok(())
}

fn guide_menu(service: &GuideService, key: &str, guide: GuideKind) -> Result<()> {
    loop {
        let snap = match service.enter_guide(key, guide) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Error: {}", e.user_message());
                return Ok(());
            }
        };
        print_snapshot(&snap);
        println!("c) Completar el paso actual   r) Reiniciar la guía   e) Esperar estado   v) Volver");
        match prompt("Elige una opción: ")?.trim() {
            "c" => {
                if snap.session.is_complete() {
                    println!("La guía ya está completa. Reiníciela para empezar de nuevo.");
                    continue;
                }
                let payload = match read_payload(&snap)? {
                    Some(p) => p,
                    None => continue,
                };
                match service.submit_step(key, guide, snap.current_step, payload) {
                    Ok(next) => println!("Paso completado. Siguiente: {}", next.current_step),
                    Err(e) => report(&e),
                }
            }
            "r" => {
                let confirm = prompt("¿Reiniciar la guía? escribir 'yes' para confirmar: ")?;
                match service.reset_guide(key, guide, confirm.trim().eq_ignore_ascii_case("yes")) {
                    Ok(()) => println!("Hecho."),
                    Err(e) => report(&e),
                }
            }
            "e" => wait_menu(service, &snap),
            "v" => return Ok(()),
            other => println!("Opción inválida: {}", other),
        }
    }
}

fn print_snapshot(snap: &GuideSnapshot) {
    let s = &snap.session;
    println!("\n-- Guía {} --", snap.guide);
    match snap.current_step {
        StepId::Complete => println!("Estado: completa"),
        step => println!("Paso actual: {} ({})", snap.step_title, step),
    }
    if let Some(p) = &s.selected_plugin {
        println!("  plugin: {} {}", p.plugin_name, p.plugin_version);
    }
    if let Some(img) = &s.registered_image_id {
        println!("  imagen: {}", img);
    }
    if !s.node_group_template_ids.is_empty() {
        println!("  grupos de nodos: {}", s.node_group_template_ids.join(", "));
    }
    print_field("plantilla de cluster", &s.cluster_template_id);
    print_field("cluster", &s.cluster_id);
    if let Some(jt) = &s.job_type {
        println!("  tipo de trabajo: {}", jt.label());
    }
    if !s.data_source_ids.is_empty() {
        println!("  orígenes de datos: {}", s.data_source_ids.join(", "));
    }
    print_field("plantilla de trabajo", &s.job_template_id);
    print_field("ejecución", &s.job_execution_id);

    match &snap.options {
        StepOptions::Plugins { plugins } => {
            for p in plugins {
                println!("  * {} ({}): {}", p.name, p.title, p.versions.join(", "));
            }
        }
        StepOptions::NodeGroupTemplates { existing, show_existing } if *show_existing => {
            for t in existing {
                println!("  * existente {} [{}]: {}", t.id, t.name, t.node_processes.join(", "));
            }
        }
        StepOptions::JobTypes { job_types } => {
            let labels: Vec<&str> = job_types.iter().map(|t| t.as_str()).collect();
            println!("  tipos: {}", labels.join(", "));
        }
        StepOptions::LaunchJob { suggested_cluster: Some(c) } => {
            println!("  cluster sugerido: {} ({})", c.cluster_id, c.status);
            if let Some(w) = &c.warning {
                println!("  aviso: {}", w);
            }
        }
        _ => {}
    }
}

fn print_field(label: &str, value: &Option<String>) {
    if let Some(v) = value {
        println!("  {}: {}", label, v);
    }
}

fn report(e: &GuideError) {
    eprintln!("Error: {}", e.user_message());
    if !e.is_recoverable() {
        eprintln!("Detalle: {}", e);
    }
}

/// Pide al usuario los datos del paso actual. `None` si cancela.
fn read_payload(snap: &GuideSnapshot) -> io::Result<Option<StepPayload>> {
    let payload = match snap.current_step {
        StepId::PluginSelect => {
            let plugin_name = prompt("Plugin: ")?.trim().to_string();
            let plugin_version = prompt("Versión: ")?.trim().to_string();
            StepPayload::ChoosePlugin { plugin_name, plugin_version }
        }
        StepId::ImageRegister => StepPayload::RegisterImage(ImageSpec { image_id: prompt("Id de la imagen: ")?.trim().into(),
                                                                        user_name: prompt("Usuario: ")?.trim().into(),
                                                                        description: optional(prompt("Descripción (enter para vacío): ")?),
                                                                        tags: list(&prompt("Etiquetas separadas por comas: ")?) }),
        StepId::NodeGroupSelect => match prompt("n) Nueva plantilla  e) Plantilla existente  f) Terminar: ")?.trim() {
            "n" => StepPayload::AddNodeGroupTemplate(NodeGroupTemplateSpec { name: prompt("Nombre: ")?.trim().into(),
                                                                             flavor_id: prompt("Flavor: ")?.trim().into(),
                                                                             node_processes: list(&prompt("Procesos separados por comas: ")?),
                                                                             description: None }),
            "e" => StepPayload::UseExistingNodeGroupTemplate { template_id: prompt("Id de la plantilla: ")?.trim().into() },
            "f" => StepPayload::FinishNodeGroups,
            _ => return Ok(None),
        },
        StepId::ClusterTemplate => {
            let name = prompt("Nombre de la plantilla de cluster: ")?.trim().to_string();
            let mut counts = HashMap::new();
            for id in &snap.session.node_group_template_ids {
                let raw = prompt(&format!("Instancias de {} (enter = 1): ", id))?;
                if let Ok(n) = raw.trim().parse::<u32>() {
                    counts.insert(id.clone(), n);
                }
            }
            StepPayload::CreateClusterTemplate(ClusterTemplateSpec { name, description: None, counts })
        }
        StepId::ClusterLaunch => StepPayload::LaunchCluster(ClusterLaunchSpec { name: prompt("Nombre del cluster: ")?.trim().into(),
                                                                                user_keypair_id: optional(prompt("Keypair (enter para ninguno): ")?),
                                                                                net_id: optional(prompt("Red (enter para ninguna): ")?),
                                                                                description: None }),
        StepId::JobTypeSelect => StepPayload::ChooseJobType { job_type: JobType::from(prompt("Tipo de trabajo: ")?.trim()) },
        StepId::DataSourceStep => match prompt("n) Nuevo origen de datos  f) Terminar: ")?.trim() {
            "n" => StepPayload::AddDataSource(DataSourceSpec { name: prompt("Nombre: ")?.trim().into(),
                                                               ds_type: prompt("Tipo (swift, hdfs, s3...): ")?.trim().into(),
                                                               url: prompt("URL: ")?.trim().into(),
                                                               description: None }),
            "f" => StepPayload::FinishDataSources,
            _ => return Ok(None),
        },
        StepId::JobTemplate => StepPayload::CreateJobTemplate(JobTemplateSpec { name: prompt("Nombre de la plantilla: ")?.trim().into(),
                                                                                mains: list(&prompt("Binarios principales separados por comas: ")?),
                                                                                libs: list(&prompt("Librerías separadas por comas: ")?),
                                                                                description: None }),
        StepId::JobLaunch => StepPayload::LaunchJob(JobLaunchSpec { cluster_id: optional(prompt("Cluster (enter para el sugerido): ")?),
                                                                    input_id: optional(prompt("Origen de entrada (enter para ninguno): ")?),
                                                                    output_id: optional(prompt("Origen de salida (enter para ninguno): ")?),
                                                                    configs: serde_json::json!({}) }),
        StepId::Complete => return Ok(None),
    };
    Ok(Some(payload))
}

fn wait_menu(service: &GuideService, snap: &GuideSnapshot) {
    let (kind, id, targets) = match (&snap.session.cluster_id, &snap.session.job_execution_id) {
        (Some(c), _) => (EntityKind::Cluster, c.clone(), vec![EntityStatus::Active]),
        (_, Some(j)) => (EntityKind::JobExecution, j.clone(), vec![EntityStatus::Succeeded]),
        _ => {
            println!("Todavía no hay cluster ni ejecución que esperar.");
            return;
        }
    };
    println!("Esperando a que {} {} llegue a {:?} (máximo {} s)...",
             kind,
             id,
             targets,
             service.config().poll.timeout_ms / 1000);
    match service.wait_for_status(kind, &id, &targets) {
        Ok(status) => println!("{} {}: {}", kind, id, status),
        Err(e) => report(&e),
    }
}

fn optional(s: String) -> Option<String> {
    let t = s.trim();
    if t.is_empty() { None } else { Some(t.to_string()) }
}

fn list(s: &str) -> Vec<String> {
    s.split(',').map(str::trim).filter(|p| !p.is_empty()).map(str::to_string).collect()
}

fn prompt(msg: &str) -> io::Result<String> {
    print!("{}", msg);
    io::stdout().flush()?;
    let mut s = String::new();
    io::stdin().read_line(&mut s)?;
    Ok(s)
}
