use crate::scene::mesh::{Mesh, Triangle};
use log::{debug, info, warn};
use nalgebra::Vector3;
use std::io::BufReader;
use std::path::Path;
use thiserror::Error;

/// 网格加载错误，启动时出现即为致命错误
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("加载 OBJ 失败 '{path}': {source}")]
    Obj {
        path: String,
        #[source]
        source: tobj::LoadError,
    },
    #[error("网格 '{name}' 不包含任何有效三角形")]
    EmptyMesh { name: String },
}

fn load_options() -> tobj::LoadOptions {
    tobj::LoadOptions {
        triangulate: true,   // 将所有面转换为三角形
        single_index: true,  // 只需要位置，统一索引即可
        ignore_points: true, // 忽略点元素
        ignore_lines: true,  // 忽略线元素
        ..Default::default()
    }
}

/// 从文件路径中提取基本文件名（不含扩展名）
fn get_basename_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unknown".to_string())
}

/// 将 tobj 的所有子模型展平为一个三角形列表，越界索引的面被跳过
fn collect_triangles(name: &str, models: &[tobj::Model]) -> Vec<Triangle> {
    let mut triangles = Vec::new();
    let mut skipped = 0usize;

    for model in models {
        let mesh = &model.mesh;
        let vertex_count = mesh.positions.len() / 3;
        let position = |i: u32| {
            let i = i as usize;
            (i < vertex_count).then(|| {
                Vector3::new(
                    mesh.positions[i * 3],
                    mesh.positions[i * 3 + 1],
                    mesh.positions[i * 3 + 2],
                )
            })
        };

        for face in mesh.indices.chunks_exact(3) {
            match (position(face[0]), position(face[1]), position(face[2])) {
                (Some(a), Some(b), Some(c)) => triangles.push(Triangle::new(a, b, c)),
                _ => skipped += 1,
            }
        }
        debug!(
            "子模型 '{}': {} 个顶点, {} 个面",
            model.name,
            vertex_count,
            mesh.indices.len() / 3
        );
    }

    if skipped > 0 {
        warn!("'{}' 中有 {} 个面包含越界的顶点索引，已跳过", name, skipped);
    }
    triangles
}

/// 加载 OBJ 文件为单一网格，材质文件被忽略
pub fn load_mesh<P: AsRef<Path>>(obj_path: P) -> Result<Mesh, LoadError> {
    let obj_path = obj_path.as_ref();
    info!("加载 OBJ 文件: {:?}", obj_path);

    let (models, _materials) =
        tobj::load_obj(obj_path, &load_options()).map_err(|source| LoadError::Obj {
            path: obj_path.display().to_string(),
            source,
        })?;

    let name = get_basename_from_path(obj_path);
    let triangles = collect_triangles(&name, &models);
    Mesh::new(name, triangles)
}

/// 从内存中的 OBJ 文本加载网格
pub fn load_mesh_from_str(name: &str, obj_source: &str) -> Result<Mesh, LoadError> {
    let mut reader = BufReader::new(obj_source.as_bytes());

    let (models, _materials) = tobj::load_obj_buf(&mut reader, &load_options(), |_| {
        Err(tobj::LoadError::OpenFileFailed)
    })
    .map_err(|source| LoadError::Obj {
        path: name.to_string(),
        source,
    })?;

    let triangles = collect_triangles(name, &models);
    Mesh::new(name, triangles)
}
