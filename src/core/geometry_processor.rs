use crate::core::rasterizer::ScreenVertex;
use crate::geometry::camera::Camera;
use crate::geometry::clipping::clip_triangle_near;
use crate::geometry::matrix::Mat4;
use crate::geometry::transform::ndc_to_pixel;
use crate::scene::mesh::Triangle;
use crate::scene::model::Model;
use nalgebra::Vector3;

/// 单个三角形经过几何阶段后的去向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriangleFate {
    /// 完整位于近平面之前
    Accepted,
    /// 跨越近平面，已裁剪为 1 或 2 个三角形
    Clipped,
    /// 完全位于近平面之后或远平面之外
    Rejected,
}

/// 几何处理器，负责顶点变换、近平面裁剪、投影和视口映射
///
/// 每帧构造一次，缓存 模型 × 视图 矩阵与投影矩阵。
pub struct GeometryProcessor {
    model_view: Mat4,
    projection: Mat4,
    near: f32,
    far: f32,
    width: f32,
    height: f32,
}

impl GeometryProcessor {
    pub fn new(model: &Model, camera: &Camera) -> Self {
        Self {
            model_view: model.world_matrix() * *camera.view_matrix(),
            projection: *camera.projection_matrix(),
            near: camera.near(),
            far: camera.far(),
            width: camera.width() as f32,
            height: camera.height() as f32,
        }
    }

    /// 模型空间 -> 视图空间
    pub fn to_view(&self, triangle: &Triangle) -> [Vector3<f32>; 3] {
        triangle
            .vertices
            .map(|v| self.model_view.transform_point(&v).point)
    }

    /// 视图空间 -> 屏幕空间；调用前必须保证 `z >= near`
    fn project(&self, view: &Vector3<f32>) -> ScreenVertex {
        let ndc = self.projection.transform_point(view).point;
        let pixel = ndc_to_pixel(&ndc, self.width, self.height);
        ScreenVertex::new(pixel.x, pixel.y, ndc.z)
    }

    /// 处理一个三角形，把得到的屏幕三角形追加到 `out`
    pub fn process(&self, triangle: &Triangle, out: &mut Vec<[ScreenVertex; 3]>) -> TriangleFate {
        let view = self.to_view(triangle);

        if view.iter().all(|v| v.z > self.far) {
            return TriangleFate::Rejected;
        }

        let polygon = clip_triangle_near(&view, self.near);
        if polygon.is_empty() {
            return TriangleFate::Rejected;
        }

        out.extend(
            polygon
                .triangles()
                .map(|tri| tri.map(|v| self.project(&v))),
        );

        if polygon.clipped {
            TriangleFate::Clipped
        } else {
            TriangleFate::Accepted
        }
    }
}
