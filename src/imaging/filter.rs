//! # Filtro de Mediana
//! src/imaging/filter.rs
//!
//! Reemplaza cada canal de cada pixel por la mediana de su vecindario de
//! 3x3. En los bordes las coordenadas se recortan a la imagen (se replica
//! el borde), así que una imagen de 1x1 es válida.

use thiserror::Error;

/// Lado de la ventana (impar)
pub const MEDIAN_WINDOW: usize = 3;

const WINDOW_LEN: usize = MEDIAN_WINDOW * MEDIAN_WINDOW;

/// Dimensiones que no permiten construir un buffer de pixeles
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("image has a zero dimension ({width}x{height}x{channels})")]
    Empty {
        width: usize,
        height: usize,
        channels: usize,
    },

    #[error("{width}x{height}x{channels} bytes does not fit in memory")]
    Overflow {
        width: usize,
        height: usize,
        channels: usize,
    },

    #[error("pixel buffer has {actual} bytes, expected {expected}")]
    LengthMismatch { expected: usize, actual: usize },
}

/// Calcula `width * height * channels` validando el resultado
pub fn grid_len(width: usize, height: usize, channels: usize) -> Result<usize, GridError> {
    if width == 0 || height == 0 || channels == 0 {
        return Err(GridError::Empty {
            width,
            height,
            channels,
        });
    }
    width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(channels))
        .filter(|&n| n <= isize::MAX as usize)
        .ok_or(GridError::Overflow {
            width,
            height,
            channels,
        })
}

/// Imagen de 8 bits por canal, canales intercalados, filas contiguas
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    width: usize,
    height: usize,
    channels: usize,
    data: Vec<u8>,
}

impl PixelGrid {
    pub fn new(width: usize, height: usize, channels: usize, data: Vec<u8>) -> Result<Self, GridError> {
        let expected = grid_len(width, height, channels)?;
        if data.len() != expected {
            return Err(GridError::LengthMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Valor de un canal con coordenadas recortadas a la imagen
    fn clamped(&self, x: isize, y: isize, channel: usize) -> u8 {
        let x = x.clamp(0, self.width as isize - 1) as usize;
        let y = y.clamp(0, self.height as isize - 1) as usize;
        self.data[(y * self.width + x) * self.channels + channel]
    }

    /// Aplica el filtro de mediana y retorna una imagen nueva
    pub fn median_filter(&self) -> PixelGrid {
        let half = (MEDIAN_WINDOW / 2) as isize;
        let mut filtered = vec![0u8; self.data.len()];
        let mut window = [0u8; WINDOW_LEN];

        for y in 0..self.height {
            for x in 0..self.width {
                for c in 0..self.channels {
                    let mut i = 0;
                    for wy in -half..=half {
                        for wx in -half..=half {
                            window[i] = self.clamped(x as isize + wx, y as isize + wy, c);
                            i += 1;
                        }
                    }
                    window.sort_unstable();
                    filtered[(y * self.width + x) * self.channels + c] = window[WINDOW_LEN / 2];
                }
            }
        }

        PixelGrid {
            width: self.width,
            height: self.height,
            channels: self.channels,
            data: filtered,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_image_is_unchanged() {
        let grid = PixelGrid::new(5, 4, 3, [10u8, 200, 77].repeat(20)).unwrap();
        let once = grid.median_filter();
        assert_eq!(once, grid);
        assert_eq!(once.median_filter(), once);
    }

    #[test]
    fn test_single_pixel() {
        let grid = PixelGrid::new(1, 1, 4, vec![1, 2, 3, 4]).unwrap();
        assert_eq!(grid.median_filter().data(), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_salt_noise_is_removed() {
        let mut data = vec![50u8; 25];
        data[12] = 255; // centro de 5x5
        data[0] = 0; // esquina
        let grid = PixelGrid::new(5, 5, 1, data).unwrap();
        assert!(grid.median_filter().data().iter().all(|&v| v == 50));
    }

    #[test]
    fn test_channels_are_independent() {
        // 3x1 gris+alpha: el alpha no contamina al gris
        let grid = PixelGrid::new(3, 1, 2, vec![0, 255, 100, 255, 200, 0]).unwrap();
        let filtered = grid.median_filter();
        // pixel 0, canal 0: ventana recortada = {0,0,100} x 3 filas -> mediana 0
        assert_eq!(filtered.data()[0], 0);
        // pixel 1, canal 0: {0,100,200} x 3 -> 100
        assert_eq!(filtered.data()[2], 100);
        // pixel 1, canal 1: {255,255,0} x 3 -> 255
        assert_eq!(filtered.data()[3], 255);
    }

    #[test]
    fn test_edge_replication() {
        // Fila 1x3: [0, 9, 9]. En x=0 la ventana es {0,0,9} por fila -> 0
        let grid = PixelGrid::new(3, 1, 1, vec![0, 9, 9]).unwrap();
        assert_eq!(grid.median_filter().data(), &[0, 9, 9]);
    }

    #[test]
    fn test_grid_len_guards() {
        assert_eq!(grid_len(2, 3, 4), Ok(24));
        assert!(matches!(grid_len(0, 3, 4), Err(GridError::Empty { .. })));
        assert!(matches!(grid_len(3, 3, 0), Err(GridError::Empty { .. })));
        assert!(matches!(
            grid_len(usize::MAX, 2, 1),
            Err(GridError::Overflow { .. })
        ));
    }

    #[test]
    fn test_length_mismatch() {
        assert_eq!(
            PixelGrid::new(2, 2, 1, vec![0; 3]),
            Err(GridError::LengthMismatch {
                expected: 4,
                actual: 3
            })
        );
    }
}
