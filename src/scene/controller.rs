//! 外部事件循环与场景之间的输入桥接
//!
//! 核心从不主动轮询输入：窗口层或无头模式每帧构造一个 [`FrameInput`]，
//! 这里的纯函数把它换算成相机位移和模型姿态增量，所有运动都按帧耗时缩放。

use crate::geometry::camera::Camera;
use crate::geometry::rotation::{Quaternion, compose_pitch_yaw};
use crate::scene::model::Model;
use nalgebra::Vector3;

/// 单帧输入快照
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameInput {
    /// 沿相机前方向的移动：-1、0 或 +1
    pub forward: f32,
    /// 绕X轴旋转量（鼠标纵向位移）
    pub rotate_x: f32,
    /// 绕Y轴旋转量（鼠标横向位移）
    pub rotate_y: f32,
    /// 距上一帧的毫秒数
    pub elapsed_ms: f32,
}

/// 输入灵敏度
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlSettings {
    /// 每毫秒移动的世界单位
    pub move_speed: f32,
    /// 每单位输入每毫秒旋转的角度（度）
    pub rotation_speed: f32,
}

impl Default for ControlSettings {
    fn default() -> Self {
        Self {
            move_speed: 0.001,
            rotation_speed: 0.001,
        }
    }
}

/// 计算相机的新位置
pub fn camera_step(
    position: &Vector3<f32>,
    forward_axis: &Vector3<f32>,
    input: &FrameInput,
    controls: &ControlSettings,
) -> Vector3<f32> {
    position + forward_axis * (input.forward * input.elapsed_ms * controls.move_speed)
}

/// 本帧的姿态增量：先绕X轴俯仰，再绕Y轴偏航
pub fn frame_rotation(input: &FrameInput, controls: &ControlSettings) -> Quaternion {
    let scale = input.elapsed_ms * controls.rotation_speed;
    let pitch = (input.rotate_x * scale).to_radians();
    let yaw = (input.rotate_y * scale).to_radians();
    compose_pitch_yaw(&Quaternion::identity(), pitch, yaw)
}

/// 将一帧输入同时作用到相机和模型上
pub fn apply_frame_input(
    model: &mut Model,
    camera: &mut Camera,
    input: &FrameInput,
    controls: &ControlSettings,
) {
    if input.forward != 0.0 {
        let position = camera_step(&camera.position(), &camera.forward(), input, controls);
        camera.set_position(position);
    }
    if input.rotate_x != 0.0 || input.rotate_y != 0.0 {
        model.rotate(&frame_rotation(input, controls));
    }
}
