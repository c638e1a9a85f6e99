/// 每个像素的字节数（RGBA8）
pub const PIXEL_SIZE: usize = 4;

/// 帧缓冲区实现，存储渲染结果
///
/// 尺寸在构造后固定；每帧整体清除并重写，不重新分配内存。
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    width: usize,
    height: usize,
    /// 存储NDC深度 [0, 1]，数值越小表示越近；`+∞` 表示尚无记录
    depth_buffer: Vec<f32>,
    /// 按行存储的RGBA颜色值，原点在左上角
    color_buffer: Vec<u8>,
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        let num_pixels = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; num_pixels],
            color_buffer: vec![0; num_pixels * PIXEL_SIZE],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// 用背景色填充颜色缓冲区，并重置深度缓冲区
    pub fn clear(&mut self, background: [u8; 3]) {
        self.depth_buffer.fill(f32::INFINITY);

        let [r, g, b] = background;
        for pixel in self.color_buffer.chunks_exact_mut(PIXEL_SIZE) {
            pixel.copy_from_slice(&[r, g, b, 255]);
        }
    }

    /// 深度测试：仅当新深度严格更近时写入颜色并更新深度记录
    ///
    /// 返回是否写入。调用方需保证坐标位于缓冲区内。
    #[inline]
    pub fn test_and_set(&mut self, x: usize, y: usize, depth: f32, color: [u8; 3]) -> bool {
        let index = y * self.width + x;
        if depth >= self.depth_buffer[index] {
            return false;
        }
        self.depth_buffer[index] = depth;

        let offset = index * PIXEL_SIZE;
        let [r, g, b] = color;
        self.color_buffer[offset..offset + PIXEL_SIZE].copy_from_slice(&[r, g, b, 255]);
        true
    }

    /// 读取像素颜色，越界时返回 None
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y * self.width + x) * PIXEL_SIZE;
        let mut rgba = [0u8; PIXEL_SIZE];
        rgba.copy_from_slice(&self.color_buffer[offset..offset + PIXEL_SIZE]);
        Some(rgba)
    }

    /// 读取深度记录，越界时返回 None
    pub fn depth_at(&self, x: usize, y: usize) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.depth_buffer[y * self.width + x])
    }

    /// 获取颜色缓冲区的字节数据（RGBA8）
    pub fn color_bytes(&self) -> &[u8] {
        &self.color_buffer
    }

    /// 获取深度缓冲区的浮点数据
    pub fn depth_values(&self) -> &[f32] {
        &self.depth_buffer
    }

    /// 颜色缓冲区去掉 alpha 通道后的 RGB8 数据，用于保存图像
    pub fn rgb_bytes(&self) -> Vec<u8> {
        self.color_buffer
            .chunks_exact(PIXEL_SIZE)
            .flat_map(|pixel| [pixel[0], pixel[1], pixel[2]])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffers_are_sized_from_dimensions() {
        let fb = FrameBuffer::new(8, 4);
        assert_eq!(fb.color_bytes().len(), 8 * 4 * PIXEL_SIZE);
        assert_eq!(fb.depth_values().len(), 8 * 4);
        assert!(fb.depth_values().iter().all(|d| d.is_infinite()));
    }

    #[test]
    fn clear_resets_color_and_depth() {
        let mut fb = FrameBuffer::new(2, 2);
        assert!(fb.test_and_set(1, 1, 0.5, [1, 2, 3]));

        fb.clear([10, 20, 30]);
        assert_eq!(fb.pixel(1, 1), Some([10, 20, 30, 255]));
        assert_eq!(fb.depth_at(1, 1), Some(f32::INFINITY));
        assert_eq!(fb.rgb_bytes(), [10, 20, 30].repeat(4));
    }

    #[test]
    fn depth_test_keeps_strictly_nearer() {
        let mut fb = FrameBuffer::new(1, 1);
        assert!(fb.test_and_set(0, 0, 0.6, [255, 0, 0]));
        assert!(!fb.test_and_set(0, 0, 0.8, [0, 255, 0]));
        // 深度相等时不覆盖
        assert!(!fb.test_and_set(0, 0, 0.6, [0, 0, 255]));
        assert!(fb.test_and_set(0, 0, 0.2, [0, 0, 255]));

        assert_eq!(fb.pixel(0, 0), Some([0, 0, 255, 255]));
        assert_eq!(fb.depth_at(0, 0), Some(0.2));
    }

    #[test]
    fn out_of_bounds_reads_are_none() {
        let fb = FrameBuffer::new(3, 2);
        assert_eq!(fb.pixel(3, 0), None);
        assert_eq!(fb.depth_at(0, 2), None);
    }
}
